use serde::{Deserialize, Serialize};

/// Number of `f32` values in one striped [`VertexRecord`].
pub const FLOATS_PER_VERTEX: usize = 8;

/// A single renderer-ready vertex.
///
/// The layout is striped `[pos.xyz, normal.xyz, uv.uv]` and is part of the
/// wire contract: hosts blit buffers of these directly, so the field order
/// must never change. Position has to stay first.
#[repr(C)]
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
pub struct VertexRecord {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl VertexRecord {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    pub fn to_array(&self) -> [f32; FLOATS_PER_VERTEX] {
        let [x, y, z] = self.position;
        let [i, j, k] = self.normal;
        let [u, v] = self.uv;
        [x, y, z, i, j, k, u, v]
    }
}

/// Views a vertex buffer as its flat striped `f32` representation.
pub fn as_floats(vertices: &[VertexRecord]) -> &[f32] {
    bytemuck::cast_slice(vertices)
}
