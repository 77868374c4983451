use bitflags::bitflags;
use om_format::{Material, Mesh, Model, SimpleMaterial, VertexRecord};

bitflags! {
    /// Axes to negate when extracting geometry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MirrorMode: u32 {
        const X = 1;
        const Y = 2;
        const Z = 4;
    }
}

impl MirrorMode {
    pub const NONE: MirrorMode = MirrorMode::empty();

    pub fn from_axes(axes: [bool; 3]) -> Self {
        let mut mode = MirrorMode::empty();
        mode.set(MirrorMode::X, axes[0]);
        mode.set(MirrorMode::Y, axes[1]);
        mode.set(MirrorMode::Z, axes[2]);
        mode
    }

    /// Mirroring an odd number of axes turns triangles inside out.
    pub fn flips_winding(self) -> bool {
        self.bits().count_ones() % 2 == 1
    }

    pub fn apply(self, mut v: [f32; 3]) -> [f32; 3] {
        for (axis, flag) in [MirrorMode::X, MirrorMode::Y, MirrorMode::Z].iter().enumerate() {
            if self.contains(*flag) {
                v[axis] = -v[axis];
            }
        }
        v
    }
}

pub fn mirrored_vertices(vertices: &[VertexRecord], mode: MirrorMode) -> Vec<VertexRecord> {
    vertices
        .iter()
        .map(|vertex| {
            VertexRecord::new(
                mode.apply(vertex.position),
                mode.apply(vertex.normal),
                vertex.uv,
            )
        })
        .collect()
}

/// A copy of the mesh indices, with winding restored for `mode`.
///
/// With `reset_to_zero` the base vertex offset is subtracted, so the indices
/// address the mesh's own vertices.
pub fn mirrored_indices(mesh: &Mesh, mode: MirrorMode, reset_to_zero: bool) -> Vec<u32> {
    let mut indices: Vec<u32> = if reset_to_zero {
        mesh.local_indices().collect()
    } else {
        mesh.indices.clone()
    };

    if mode.flips_winding() {
        for triangle in indices.chunks_exact_mut(3) {
            triangle.swap(1, 2);
        }
    }
    indices
}

/// Mirrors vertices and winding, keeping the mesh's buffer offset.
pub fn mirror_mesh(mesh: &Mesh, mode: MirrorMode) -> Mesh {
    let mut mirrored = mesh.descriptor_copy();
    mirrored.vertices = mirrored_vertices(&mesh.vertices, mode);
    mirrored.indices = mirrored_indices(mesh, mode, false);
    mirrored.base_vertex = mesh.base_vertex;
    mirrored
}

pub fn mirror_model(model: &Model, mode: MirrorMode) -> Model {
    Model {
        meshes: model.meshes.iter().map(|mesh| mirror_mesh(mesh, mode)).collect(),
        layout: model.layout,
    }
}

/// Everything a host needs to build one engine mesh, with separated
/// attribute arrays and zero-based indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub group_face_name: String,
    pub group_name: String,
    pub material: Material,
    pub simple_material: SimpleMaterial,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn material_name(&self) -> &str {
        &self.material.name
    }
}

pub fn mesh_data(mesh: &Mesh, mode: MirrorMode) -> MeshData {
    MeshData {
        group_face_name: mesh.group_face_name.clone(),
        group_name: mesh.group_name.clone(),
        material: mesh.material.clone(),
        simple_material: mesh.material.to_simple(),
        positions: mesh.vertices.iter().map(|v| mode.apply(v.position)).collect(),
        normals: mesh.vertices.iter().map(|v| mode.apply(v.normal)).collect(),
        uvs: mesh.vertices.iter().map(|v| v.uv).collect(),
        indices: mirrored_indices(mesh, mode, true),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn triangle_mesh() -> Mesh {
        let mut mesh = Mesh::new("g", Material::new("m"));
        mesh.vertices = vec![
            VertexRecord::new([1.0, 2.0, 3.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            VertexRecord::new([4.0, 5.0, 6.0], [0.0, 1.0, 0.0], [1.0, 0.0]),
            VertexRecord::new([7.0, 8.0, 9.0], [1.0, 0.0, 0.0], [0.0, 1.0]),
        ];
        mesh.indices = vec![5, 6, 7];
        mesh.base_vertex = 5;
        mesh
    }

    #[test]
    fn test_mirror_winding() {
        let mesh = triangle_mesh();

        for bits in 0..8 {
            let mode = MirrorMode::from_bits_truncate(bits);
            let expected = if bits.count_ones() % 2 == 1 {
                vec![0, 2, 1]
            } else {
                vec![0, 1, 2]
            };
            assert_eq!(mirrored_indices(&mesh, mode, true), expected, "mode {:?}", mode);
        }

        assert_eq!(mirrored_indices(&mesh, MirrorMode::X, false), vec![5, 7, 6]);
    }

    #[test]
    fn test_mirror_vertices() {
        let mode = MirrorMode::from_axes([true, false, true]);
        assert_eq!(mode, MirrorMode::X | MirrorMode::Z);
        assert!(!mode.flips_winding());

        let mirrored = mirror_mesh(&triangle_mesh(), mode);
        assert_eq!(mirrored.vertices[0].position, [-1.0, 2.0, -3.0]);
        assert_eq!(mirrored.vertices[0].normal, [0.0, 0.0, -1.0]);
        assert_eq!(mirrored.vertices[1].uv, [1.0, 0.0]);
        assert_eq!(mirrored.base_vertex, 5);
        assert_eq!(mirrored.indices, vec![5, 6, 7]);
    }

    #[test]
    fn test_mesh_data() {
        let data = mesh_data(&triangle_mesh(), MirrorMode::Y);

        assert_eq!(data.group_face_name, "g:mtl:m");
        assert_eq!(data.material_name(), "m");
        assert_eq!(data.positions[2], [7.0, -8.0, 9.0]);
        assert_eq!(data.normals[1], [0.0, -1.0, 0.0]);
        assert_eq!(data.uvs[2], [0.0, 1.0]);
        assert_eq!(data.indices, vec![0, 2, 1]);
    }
}
