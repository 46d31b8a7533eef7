//! Renderer core: the explicit GPU context, owning resource handles, texture
//! helpers, pipeline helpers, bind group reuse and readback.

pub mod binding;
pub mod context;
pub mod pipeline;
pub mod readback;
pub mod texture;
pub mod tracked;
pub mod uniform;

pub use binding::{BindGroupKey, CachedBindGroup};
pub use context::{GpuContext, WgpuContext};
pub use pipeline::{DepthMode, ScopedPipeline};
pub use texture::GpuTexture;
pub use tracked::{ResourceCategory, ResourceLedger, Slot, Tracked};
pub use uniform::UniformBuffer;
