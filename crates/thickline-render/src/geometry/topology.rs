//! The quad topology shared by every segment instance.
//!
//! Each segment is drawn as a strip of three quads: a start cap, the body
//! and an end cap. `x = ±1` selects the side of the line, `y` runs from the
//! start cap (`y < 0`) through the body to the end cap (`y > 1`).

/// A vertex of the shared segment quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    /// Position in segment-local quad space.
    pub position: [f32; 3],
    /// Cap-aware UV.
    pub uv: [f32; 2],
}

/// Quad vertex positions.
pub const QUAD_POSITIONS: [[f32; 3]; 8] = [
    [-1.0, 2.0, 0.0],
    [1.0, 2.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [-1.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
];

/// Quad vertex UVs.
pub const QUAD_UVS: [[f32; 2]; 8] = [
    [-1.0, 2.0],
    [1.0, 2.0],
    [-1.0, 1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, -2.0],
    [1.0, -2.0],
];

/// Triangle indices into [`QUAD_POSITIONS`].
pub const QUAD_INDICES: [u16; 18] = [0, 2, 1, 2, 3, 1, 2, 4, 3, 4, 5, 3, 4, 6, 5, 6, 7, 5];

/// Returns the interleaved quad vertices.
#[must_use]
pub fn quad_vertices() -> [QuadVertex; 8] {
    std::array::from_fn(|i| QuadVertex {
        position: QUAD_POSITIONS[i],
        uv: QUAD_UVS[i],
    })
}
