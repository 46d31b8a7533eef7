use std::f32::consts::PI;

use crate::resources::geometry::{Geometry, Vertex};

/// Segment count used for both latitude and longitude of the probe sphere.
pub const SPHERE_SEGMENTS: u32 = 64;

/// Unit-radius UV sphere built from stacked latitude rings.
///
/// Indexed as one continuous triangle strip: even rows walk left to right,
/// odd rows walk back right to left, so consecutive rows share their seam
/// without restart indices.
#[must_use]
pub fn create_uv_sphere(x_segments: u32, y_segments: u32) -> Geometry {
    let x_segments = x_segments.max(3);
    let y_segments = y_segments.max(2);

    let mut vertices = Vec::with_capacity(((x_segments + 1) * (y_segments + 1)) as usize);
    for y in 0..=y_segments {
        for x in 0..=x_segments {
            let u = x as f32 / x_segments as f32;
            let v = y as f32 / y_segments as f32;
            let px = (u * 2.0 * PI).cos() * (v * PI).sin();
            let py = (v * PI).cos();
            let pz = (u * 2.0 * PI).sin() * (v * PI).sin();

            // Unit radius: the position is its own normal.
            vertices.push(Vertex::new([px, py, pz], [px, py, pz], [u, v]));
        }
    }

    let stride = x_segments + 1;
    let mut indices = Vec::with_capacity((y_segments * stride * 2) as usize);
    for y in 0..y_segments {
        if y % 2 == 0 {
            for x in 0..=x_segments {
                indices.push(y * stride + x);
                indices.push((y + 1) * stride + x);
            }
        } else {
            for x in (0..=x_segments).rev() {
                indices.push((y + 1) * stride + x);
                indices.push(y * stride + x);
            }
        }
    }

    Geometry::new(vertices, indices, wgpu::PrimitiveTopology::TriangleStrip)
}
