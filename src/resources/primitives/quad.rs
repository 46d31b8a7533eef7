use crate::resources::geometry::{Geometry, Vertex};

/// Full-screen quad covering clip space, as a 4-vertex triangle strip.
///
/// UVs follow texture space (v grows downward) so a sampled target appears upright.
#[must_use]
pub fn create_screen_quad() -> Geometry {
    let normal = [0.0, 0.0, 1.0];
    let vertices = vec![
        Vertex::new([-1.0, 1.0, 0.0], normal, [0.0, 0.0]),
        Vertex::new([-1.0, -1.0, 0.0], normal, [0.0, 1.0]),
        Vertex::new([1.0, 1.0, 0.0], normal, [1.0, 0.0]),
        Vertex::new([1.0, -1.0, 0.0], normal, [1.0, 1.0]),
    ];
    let indices = vec![0, 1, 2, 3];

    Geometry::new(vertices, indices, wgpu::PrimitiveTopology::TriangleStrip)
}
