//! CPU-side geometry shared by loaded meshes and built-in primitives.
//!
//! Every drawable in the viewer uses the same interleaved [`Vertex`] layout
//! (position, normal, uv), so a single vertex buffer layout serves all pipelines.

use bytemuck::{Pod, Zeroable};

/// Interleaved vertex: position, normal, texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    #[must_use]
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// The vertex buffer layout used by every pipeline in the renderer.
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Vertices + indices + the topology they are meant to be drawn with.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub topology: wgpu::PrimitiveTopology,
}

impl Geometry {
    #[must_use]
    pub fn new(
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        topology: wgpu::PrimitiveTopology,
    ) -> Self {
        Self {
            vertices,
            indices,
            topology,
        }
    }

    #[inline]
    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Strip index formats need a restart value only when strips are cut; ours never are.
    #[must_use]
    pub fn strip_index_format(&self) -> Option<wgpu::IndexFormat> {
        match self.topology {
            wgpu::PrimitiveTopology::TriangleStrip | wgpu::PrimitiveTopology::LineStrip => {
                Some(wgpu::IndexFormat::Uint32)
            }
            _ => None,
        }
    }
}
