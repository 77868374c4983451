//! Renderer-ready structures produced by objmaster: striped vertices,
//! materials with presence bits, meshes and models.

pub mod error;
pub mod material;
pub mod mesh;
pub mod vertex;

pub use error::FormatError;
pub use material::{EnabledFields, Material, SimpleMaterial, TextureSlot};
pub use mesh::{BufferLayout, Mesh, Model};
pub use vertex::VertexRecord;
