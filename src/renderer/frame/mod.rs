//! Frame Pipeline Selector
//!
//! Every frame the renderer turns the current [`ShadingPathState`] into a
//! [`FramePlan`]: the ordered list of passes of exactly one shading path, each
//! with its target, depth mode and load policy. The pass objects in this
//! module only record draws into a [`PassScope`] opened for one plan entry.
//!
//! | Path     | Passes                                                       |
//! |----------|--------------------------------------------------------------|
//! | Forward  | mesh, skybox                                                 |
//! | Deferred | geometry, [ssao, blur], lighting, light markers              |
//! | PBR      | mesh or probe sphere, environment background                 |

pub mod deferred;
pub mod forward;
pub mod pbr;
pub mod plan;
pub mod scope;
pub mod skybox;
pub mod state;
pub mod uniforms;

pub use deferred::DeferredPasses;
pub use forward::ForwardPass;
pub use pbr::{PbrPass, PbrSubject};
pub use plan::{
    DepthAttachment, FramePlan, LoadPolicy, OcclusionSource, PassDesc, PassKind, PassTarget,
};
pub use scope::{PassAttachments, PassScope};
pub use skybox::{Background, BackgroundPass};
pub use state::{LightMode, ShadingPath, ShadingPathState};
pub use uniforms::FrameUniforms;

use crate::renderer::core::GpuContext;
use crate::renderer::core::pipeline::{
    linear_sampler, repeat_sampler, sampler_entry, texture_entry, uniform_entry,
};
use crate::renderer::material::material_layout;

/// WGSL blocks shared by several frame shaders.
pub(crate) mod wgsl {
    pub const VERTEX: &str = include_str!("../shaders/vertex.wgsl");
    pub const FRAME: &str = include_str!("../shaders/frame.wgsl");
    pub const SCREEN: &str = include_str!("../shaders/screen.wgsl");
}

/// Layouts and samplers shared across the three paths.
pub struct FrameLayouts {
    /// [`FrameUniforms`] at group 0.
    pub frame: wgpu::BindGroupLayout,
    /// Albedo texture + sampler of a loaded mesh.
    pub albedo: wgpu::BindGroupLayout,
    /// Five PBR maps + sampler.
    pub material: wgpu::BindGroupLayout,
    pub linear_sampler: wgpu::Sampler,
    pub repeat_sampler: wgpu::Sampler,
}

impl FrameLayouts {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Layout"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                false,
            )],
        });
        let albedo = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Albedo Layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::D2, true),
                sampler_entry(1),
            ],
        });
        Self {
            frame,
            albedo,
            material: material_layout(device),
            linear_sampler: linear_sampler(device, "Frame Linear Sampler"),
            repeat_sampler: repeat_sampler(device, "Frame Repeat Sampler"),
        }
    }
}

/// Shared, read-only inputs of every pass recorder.
pub struct RecordContext<'a> {
    pub ctx: &'a GpuContext,
    pub layouts: &'a FrameLayouts,
    /// Bound at group 0 by every pass that reads [`FrameUniforms`].
    pub frame_group: &'a wgpu::BindGroup,
}
