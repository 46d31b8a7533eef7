use crate::resources::geometry::{Geometry, Vertex};

/// Unit cube spanning [-1, 1], 24 vertices (4 per face) and 36 indices.
///
/// Faces are wound counter-clockwise seen from outside. Passes that render from
/// inside the cube (skybox, environment capture) do not cull.
#[must_use]
pub fn create_unit_cube() -> Geometry {
    // (normal, corner positions CCW from outside)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // Front (+Z)
        (
            [0.0, 0.0, 1.0],
            [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
        ),
        // Back (-Z)
        (
            [0.0, 0.0, -1.0],
            [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0]],
        ),
        // Top (+Y)
        (
            [0.0, 1.0, 0.0],
            [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]],
        ),
        // Bottom (-Y)
        (
            [0.0, -1.0, 0.0],
            [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
        ),
        // Right (+X)
        (
            [1.0, 0.0, 0.0],
            [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]],
        ),
        // Left (-X)
        (
            [-1.0, 0.0, 0.0],
            [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
        ),
    ];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let vertices: Vec<Vertex> = faces
        .iter()
        .flat_map(|(normal, corners)| {
            corners
                .iter()
                .zip(uvs)
                .map(move |(position, uv)| Vertex::new(*position, *normal, uv))
        })
        .collect();

    // 0, 1, 2,  0, 2, 3
    let indices: Vec<u32> = (0..6)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base, base + 2, base + 3]
        })
        .collect();

    Geometry::new(vertices, indices, wgpu::PrimitiveTopology::TriangleList)
}
