mod registry;
mod writer;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::{debug, info};
use om_format::{mesh::MATERIAL_SEPARATOR, Material, Model, VertexRecord};

pub use registry::{FactoryHandle, FactoryRegistry};

use crate::{error::FactoryError, obj::MaterialLibrary};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FactoryFace {
    pub(crate) indices: [u32; 3],
    pub(crate) group: String,
    pub(crate) material: String,
}

/// Accumulates vertices, triangles and materials and writes them out as an
/// OBJ and MTL pair.
///
/// Indexing is homogeneous: one index addresses position, uv and normal.
#[derive(Debug, Default, Clone)]
pub struct ObjFactory {
    vertices: Vec<VertexRecord>,
    faces: Vec<FactoryFace>,
    materials: MaterialLibrary,
    current_group: String,
    current_material: String,
}

impl ObjFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a factory with the geometry, groups and materials of a model.
    ///
    /// Shared-buffer indices are rebased onto the factory's own buffer.
    pub fn from_model(model: &Model) -> Self {
        let mut factory = Self::new();

        for mesh in &model.meshes {
            let suffix = format!("{}{}", MATERIAL_SEPARATOR, mesh.material.name);
            let group = mesh
                .group_face_name
                .strip_suffix(suffix.as_str())
                .unwrap_or(mesh.group_name.as_str());
            factory.use_group(group);
            if !mesh.material.name.is_empty() {
                factory.add_material(mesh.material.clone());
            }
            factory.use_material(&mesh.material.name);

            let offset = factory.vertices.len() as u32;
            factory.vertices.extend_from_slice(&mesh.vertices);
            let local: Vec<u32> = mesh.local_indices().collect();
            for triangle in local.chunks_exact(3) {
                factory.push_face([
                    triangle[0] + offset,
                    triangle[1] + offset,
                    triangle[2] + offset,
                ]);
            }
        }

        factory.use_group("");
        factory.use_material("");
        debug!(
            "Seeded factory with {} vertices and {} faces",
            factory.vertices.len(),
            factory.faces.len()
        );
        factory
    }

    pub fn add_vertex(&mut self, vertex: VertexRecord) -> u32 {
        self.vertices.push(vertex);
        self.vertices.len() as u32 - 1
    }

    /// Adds a triangle in the current group and material, returning its index.
    pub fn add_face(&mut self, a: u32, b: u32, c: u32) -> Result<u32, FactoryError> {
        for index in [a, b, c] {
            if index as usize >= self.vertices.len() {
                return Err(FactoryError::VertexOutOfRange {
                    index,
                    count: self.vertices.len(),
                });
            }
        }
        Ok(self.push_face([a, b, c]))
    }

    fn push_face(&mut self, indices: [u32; 3]) -> u32 {
        self.faces.push(FactoryFace {
            indices,
            group: self.current_group.clone(),
            material: self.current_material.clone(),
        });
        self.faces.len() as u32 - 1
    }

    pub fn use_group(&mut self, name: &str) {
        self.current_group = name.to_owned();
    }

    /// Switches the material of following faces, creating an empty one if
    /// the name is unknown.
    pub fn use_material(&mut self, name: &str) {
        if !name.is_empty() && self.materials.get(name).is_none() {
            debug!("Creating placeholder material \"{}\"", name);
            self.materials.insert(Material::new(name));
        }
        self.current_material = name.to_owned();
    }

    /// Adds a material, replacing any earlier one with the same name.
    pub fn add_material(&mut self, material: Material) {
        self.materials.insert(material);
    }

    pub fn vertices(&self) -> &[VertexRecord] {
        &self.vertices
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    /// Forgets all geometry and materials; the factory stays usable.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn write_obj(&self, out: &mut impl Write, mtllib: Option<&str>) -> Result<(), FactoryError> {
        writer::write_obj(out, &self.vertices, &self.faces, mtllib)?;
        Ok(())
    }

    pub fn write_mtl(&self, out: &mut impl Write) -> Result<(), FactoryError> {
        writer::write_mtl(out, self.materials.iter())?;
        Ok(())
    }

    /// Writes `dir/file` and its material library `dir/<stem>.mtl`.
    pub fn save(&self, dir: &Path, file: &str) -> Result<(), FactoryError> {
        let obj_path = dir.join(file);
        let mtl_name = Path::new(file).with_extension("mtl");
        let mtl_name = mtl_name
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("materials.mtl");

        let mut mtl = BufWriter::new(File::create(dir.join(mtl_name))?);
        self.write_mtl(&mut mtl)?;
        mtl.flush()?;

        let mut obj = BufWriter::new(File::create(&obj_path)?);
        self.write_obj(&mut obj, Some(mtl_name))?;
        obj.flush()?;

        info!(
            "Saved {} with {} vertices, {} faces and {} materials",
            obj_path.display(),
            self.vertices.len(),
            self.faces.len(),
            self.materials.len()
        );
        Ok(())
    }
}
