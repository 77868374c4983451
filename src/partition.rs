use std::collections::HashMap;

use log::debug;
use om_format::{BufferLayout, Mesh, Model, VertexRecord};

use crate::obj::{FaceGroup, FacePoint, ObjScene};

/// Options applied while turning a parsed scene into a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub layout: BufferLayout,
}

impl LoadOptions {
    pub fn shared() -> Self {
        Self {
            layout: BufferLayout::Shared,
        }
    }
}

/// Builds one mesh per face group, in the scene's first-seen order.
///
/// Each distinct (position, uv, normal) triple of a group becomes one vertex,
/// numbered in order of first use. With [`BufferLayout::Shared`] every mesh is
/// offset by the vertex count of the meshes before it.
pub fn partition(scene: &ObjScene, options: &LoadOptions) -> Model {
    let mut meshes = Vec::with_capacity(scene.groups.len());
    let mut base_vertex = 0u32;

    for group in &scene.groups {
        let mut mesh = build_mesh(scene, group);

        if options.layout == BufferLayout::Shared {
            mesh.base_vertex = base_vertex;
            for index in &mut mesh.indices {
                *index += base_vertex;
            }
            base_vertex += mesh.vertices.len() as u32;
        }

        debug!(
            "Mesh \"{}\": {} vertices, {} indices, base vertex {}",
            mesh.group_face_name,
            mesh.vertex_count(),
            mesh.index_count(),
            mesh.base_vertex
        );
        meshes.push(mesh);
    }

    Model {
        meshes,
        layout: options.layout,
    }
}

fn build_mesh(scene: &ObjScene, group: &FaceGroup) -> Mesh {
    let mut mesh = Mesh::new(&group.group, scene.material_for(group));
    let mut lookup: HashMap<FacePoint, u32> = HashMap::new();
    mesh.indices.reserve(group.triangles.len() * 3);

    for point in group.triangles.iter().flatten() {
        let vertices = &mut mesh.vertices;
        let index = *lookup.entry(*point).or_insert_with(|| {
            vertices.push(vertex_for(scene, point));
            vertices.len() as u32 - 1
        });
        mesh.indices.push(index);
    }

    mesh
}

// missing uv and normal references become zeros
fn vertex_for(scene: &ObjScene, point: &FacePoint) -> VertexRecord {
    VertexRecord::new(
        scene.positions[point.position],
        point.normal.map_or([0.0; 3], |i| scene.normals[i]),
        point.uv.map_or([0.0; 2], |i| scene.uvs[i]),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{assets::MemoryAssets, error::LoadError, obj};
    use std::path::Path;

    const TWO_GROUPS: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 1
vn 0 0 1
g a
usemtl red
f 1/1/1 2/1/1 3/1/1
f 1/1/1 3/1/1 4/1/1
g b
f 1/2/1 2/2/1 3/2/1
g a
f 2/1/1 3/1/1 4/1
";

    fn scene() -> Result<ObjScene, LoadError> {
        let assets = MemoryAssets::new().with("model.obj", TWO_GROUPS);
        obj::parse_scene(&assets, Path::new(""), "model.obj")
    }

    #[test]
    fn test_vertex_dedup_order() -> Result<(), LoadError> {
        let model = partition(&scene()?, &LoadOptions::default());
        assert_eq!(model.meshes.len(), 2);

        let a = &model.meshes[0];
        assert_eq!(a.group_face_name, "a:mtl:red");
        assert_eq!(a.group_name, "a");
        assert_eq!(a.material_name(), "red");
        // "4/1" has no normal, so it is a vertex of its own
        assert_eq!(a.vertex_count(), 5);
        assert_eq!(a.indices, vec![0, 1, 2, 0, 2, 3, 1, 2, 4]);
        assert_eq!(a.vertices[4].normal, [0.0; 3]);
        assert_eq!(a.vertices[4].position, [0.0, 1.0, 0.0]);

        let b = &model.meshes[1];
        assert_eq!(b.indices, vec![0, 1, 2]);
        assert_eq!(b.vertices[0].uv, [1.0, 1.0]);
        assert!(model.meshes.iter().all(|m| m.base_vertex == 0));
        Ok(())
    }

    #[test]
    fn test_shared_layout() -> Result<(), LoadError> {
        let model = partition(&scene()?, &LoadOptions::shared());
        let b = &model.meshes[1];

        assert_eq!(model.layout, BufferLayout::Shared);
        assert_eq!(b.base_vertex, 5);
        assert_eq!(b.indices, vec![5, 6, 7]);
        assert_eq!(b.local_indices().collect::<Vec<_>>(), vec![0, 1, 2]);

        let shared = model.shared_vertices();
        assert_eq!(shared.len(), 8);
        for mesh in &model.meshes {
            for (&stored, local) in mesh.indices.iter().zip(mesh.local_indices()) {
                assert_eq!(shared[stored as usize], mesh.vertices[local as usize]);
            }
        }
        Ok(())
    }
}
