//! Loaded mesh data and the loader seam.
//!
//! The renderer consumes a [`MeshData`]: interleaved vertices, `u32` triangle-list
//! indices and submeshes, each with an optional albedo image. Producing one
//! from a file format is a loader's job; the crate ships
//! [`ProceduralMeshLoader`] for the builtin models.

use std::f32::consts::PI;
use std::ops::Range;

use crate::assets::AssetSource;
use crate::assets::image::PixelBuffer;
use crate::assets::procedural;
use crate::errors::{PrismError, Result};
use crate::resources::geometry::{Geometry, Vertex};
use crate::resources::primitives::create_unit_cube;

/// A slice of the index buffer drawn with its own texture.
#[derive(Debug, Clone)]
pub struct SubMesh {
    pub index_range: Range<u32>,
    /// `None` falls back to the renderer's white texture.
    pub albedo: Option<PixelBuffer>,
}

/// A mesh ready for upload.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub geometry: Geometry,
    pub submeshes: Vec<SubMesh>,
}

impl MeshData {
    /// Checks that every submesh range lies inside the index buffer and every
    /// index addresses an existing vertex.
    pub fn validate(&self) -> Result<()> {
        let index_count = self.geometry.index_count();
        if let Some(sub) = self
            .submeshes
            .iter()
            .find(|s| s.index_range.start > s.index_range.end || s.index_range.end > index_count)
        {
            return Err(PrismError::InvalidParameter {
                name: "mesh.submesh",
                reason: format!(
                    "range {:?} exceeds {index_count} indices in '{}'",
                    sub.index_range, self.name
                ),
            });
        }
        let vertex_count = self.geometry.vertices.len() as u32;
        if self.geometry.indices.iter().any(|&i| i >= vertex_count) {
            return Err(PrismError::InvalidParameter {
                name: "mesh.indices",
                reason: format!("index out of range in '{}'", self.name),
            });
        }
        Ok(())
    }
}

/// Turns an asset source into [`MeshData`].
pub trait MeshLoader {
    fn load(&self, source: &AssetSource) -> Result<MeshData>;
}

/// Loader for the `builtin:` models.
///
/// | Name     | Submeshes | Texture           |
/// |----------|-----------|-------------------|
/// | `cube`   | 1         | checker           |
/// | `sphere` | 1         | checker           |
/// | `torus`  | 1         | none (white)      |
/// | `pair`   | 2         | checker, gradient |
#[derive(Debug, Default, Clone, Copy)]
pub struct ProceduralMeshLoader;

impl MeshLoader for ProceduralMeshLoader {
    fn load(&self, source: &AssetSource) -> Result<MeshData> {
        let AssetSource::Builtin(name) = source else {
            return Err(PrismError::AssetNotFound(format!(
                "no mesh loader for file '{source}'"
            )));
        };

        let mesh = match name.as_str() {
            "cube" => single(name, create_unit_cube(), procedural::texture("checker")),
            "sphere" => single(name, sphere_list(32, 24), procedural::texture("checker")),
            "torus" => single(name, torus_list(48, 16, 0.7, 0.3), None),
            "pair" => pair(name),
            _ => return Err(PrismError::AssetNotFound(source.to_string())),
        };
        mesh.validate()?;
        Ok(mesh)
    }
}

fn single(name: &str, geometry: Geometry, albedo: Option<PixelBuffer>) -> MeshData {
    let submeshes = vec![SubMesh {
        index_range: 0..geometry.index_count(),
        albedo,
    }];
    MeshData {
        name: name.to_string(),
        geometry,
        submeshes,
    }
}

/// Two cubes side by side, each its own submesh with its own texture.
fn pair(name: &str) -> MeshData {
    let cube = create_unit_cube();
    let shift = |v: &Vertex, dx: f32| {
        let [x, y, z] = v.position;
        Vertex::new([x * 0.5 + dx, y * 0.5, z * 0.5], v.normal, v.uv)
    };

    let mut vertices: Vec<Vertex> = cube.vertices.iter().map(|v| shift(v, -0.75)).collect();
    vertices.extend(cube.vertices.iter().map(|v| shift(v, 0.75)));

    let offset = cube.vertices.len() as u32;
    let mut indices = cube.indices.clone();
    indices.extend(cube.indices.iter().map(|i| i + offset));

    let half = cube.index_count();
    MeshData {
        name: name.to_string(),
        geometry: Geometry::new(vertices, indices, wgpu::PrimitiveTopology::TriangleList),
        submeshes: vec![
            SubMesh {
                index_range: 0..half,
                albedo: procedural::texture("checker"),
            },
            SubMesh {
                index_range: half..half * 2,
                albedo: procedural::texture("gradient"),
            },
        ],
    }
}

fn sphere_list(sectors: u32, stacks: u32) -> Geometry {
    let mut vertices = Vec::with_capacity(((sectors + 1) * (stacks + 1)) as usize);
    for i in 0..=stacks {
        let v = i as f32 / stacks as f32;
        let phi = v * PI;
        for j in 0..=sectors {
            let u = j as f32 / sectors as f32;
            let theta = u * 2.0 * PI;
            let p = [theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin()];
            vertices.push(Vertex::new(p, p, [u, v]));
        }
    }

    let stride = sectors + 1;
    let mut indices = Vec::with_capacity((sectors * stacks * 6) as usize);
    for i in 0..stacks {
        for j in 0..sectors {
            let a = i * stride + j;
            let b = a + stride;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    Geometry::new(vertices, indices, wgpu::PrimitiveTopology::TriangleList)
}

fn torus_list(major_segments: u32, minor_segments: u32, major: f32, minor: f32) -> Geometry {
    let mut vertices = Vec::with_capacity(((major_segments + 1) * (minor_segments + 1)) as usize);
    for i in 0..=major_segments {
        let u = i as f32 / major_segments as f32;
        let a = u * 2.0 * PI;
        for j in 0..=minor_segments {
            let v = j as f32 / minor_segments as f32;
            let b = v * 2.0 * PI;
            let normal = [a.cos() * b.cos(), b.sin(), a.sin() * b.cos()];
            let position = [
                (major + minor * b.cos()) * a.cos(),
                minor * b.sin(),
                (major + minor * b.cos()) * a.sin(),
            ];
            vertices.push(Vertex::new(position, normal, [u, v]));
        }
    }

    let stride = minor_segments + 1;
    let mut indices = Vec::with_capacity((major_segments * minor_segments * 6) as usize);
    for i in 0..major_segments {
        for j in 0..minor_segments {
            let a = i * stride + j;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    Geometry::new(vertices, indices, wgpu::PrimitiveTopology::TriangleList)
}
