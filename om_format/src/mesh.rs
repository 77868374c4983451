use crate::error::{FormatError, Result};
use crate::material::Material;
use crate::vertex::VertexRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Separator between the group part and the material name of a group-face name.
pub const MATERIAL_SEPARATOR: &str = ":mtl:";

/// Version tag written in front of every serialized model.
pub const FORMAT_VERSION: u32 = 1;

/// Builds the `<group>:mtl:<material>` name of a (group, material) partition.
pub fn group_face_name(group: &str, material: &str) -> String {
    format!("{}{}{}", group, MATERIAL_SEPARATOR, material)
}

/// Recovers the group of a group-face name: everything before the first `:`.
///
/// Group names may carry extra `:key:value` metadata, which is dropped here
/// as well.
pub fn group_name_of(group_face_name: &str) -> &str {
    group_face_name
        .split_once(':')
        .map_or(group_face_name, |(group, _)| group)
}

/// Recovers the material name, the part after the last `:mtl:` separator.
pub fn material_name_of(group_face_name: &str) -> Option<&str> {
    group_face_name
        .rsplit_once(MATERIAL_SEPARATOR)
        .map(|(_, material)| material)
}

/// How the vertex buffers of a model's meshes relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BufferLayout {
    /// Every mesh indexes its own buffer from zero.
    PerMesh,
    /// Meshes are ranges of one concatenated buffer; indices are global.
    Shared,
}

impl Default for BufferLayout {
    fn default() -> Self {
        BufferLayout::PerMesh
    }
}

/// One (group, material) partition of a model.
///
/// `vertices` always holds exactly this mesh's vertex range. `indices` are
/// stored in buffer form, i.e. local index plus `base_vertex`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub group_face_name: String,
    pub group_name: String,
    pub material: Material,
    pub vertices: Vec<VertexRecord>,
    pub indices: Vec<u32>,
    pub base_vertex: u32,
}

impl Mesh {
    pub fn new(group: &str, material: Material) -> Self {
        Self {
            group_face_name: group_face_name(group, &material.name),
            group_name: group_name_of(group).to_owned(),
            material,
            ..Self::default()
        }
    }

    pub fn material_name(&self) -> &str {
        &self.material.name
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() && self.vertices.is_empty()
    }

    /// Indices relative to this mesh's own `vertices`.
    pub fn local_indices(&self) -> impl Iterator<Item = u32> + '_ {
        let base = self.base_vertex;
        self.indices.iter().map(move |index| index - base)
    }

    /// A geometry-less copy carrying the same names and material.
    pub fn descriptor_copy(&self) -> Self {
        Self {
            group_face_name: self.group_face_name.clone(),
            group_name: self.group_name.clone(),
            material: self.material.clone(),
            ..Self::default()
        }
    }
}

/// A loaded model: one mesh per (group, material) pair, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub layout: BufferLayout,
}

#[derive(Serialize, Deserialize)]
struct VersionedModel {
    version: u32,
    model: Model,
}

impl Model {
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(Mesh::vertex_count).sum()
    }

    /// All mesh vertex ranges concatenated in mesh order.
    ///
    /// With [`BufferLayout::Shared`] this is the buffer the stored indices
    /// address.
    pub fn shared_vertices(&self) -> Vec<VertexRecord> {
        let mut vertices = Vec::with_capacity(self.vertex_count());
        for mesh in &self.meshes {
            vertices.extend_from_slice(&mesh.vertices);
        }
        vertices
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let versioned = bincode::deserialize::<VersionedModel>(&bytes)?;
        if versioned.version != FORMAT_VERSION {
            return Err(FormatError::Version {
                found: versioned.version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(versioned.model)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Model::from_bytes(data)
    }

    pub fn to_bytes(self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&VersionedModel {
            version: FORMAT_VERSION,
            model: self,
        })?)
    }
}
