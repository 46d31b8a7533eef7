//! Renderer Settings
//!
//! Global configuration consumed once by [`Renderer::new`](super::Renderer::new)
//! and [`WgpuContext::new`](super::core::WgpuContext::new). Runtime choices
//! (shading path, SSAO toggles, PBR scalars) live in
//! [`ShadingPathState`](super::frame::ShadingPathState) instead.
//!
//! # Example
//!
//! ```rust,ignore
//! use prism::renderer::{RendererSettings, frame::ShadingPath};
//!
//! let settings = RendererSettings {
//!     initial_path: ShadingPath::Forward,
//!     vsync: false,
//!     ..Default::default()
//! };
//! ```

use crate::renderer::frame::ShadingPath;

/// Global configuration for renderer initialization.
///
/// # Fields
///
/// | Field              | Description                               | Default            |
/// |--------------------|-------------------------------------------|--------------------|
/// | `initial_path`     | Shading path of the first frame           | `Pbr`              |
/// | `vsync`            | Vertical sync enabled                     | `true`             |
/// | `backends`         | Forced wgpu backend (or auto)             | `None`             |
/// | `power_preference` | GPU adapter selection strategy            | `HighPerformance`  |
/// | `clear_color`      | Clear color of the final composite        | (0.1, 0.1, 0.1, 1) |
/// | `depth_format`     | Depth buffer texture format               | `Depth32Float`     |
/// | `ssao_seed`        | Fixed SSAO noise seed                     | `None` (per process) |
#[derive(Debug, Clone)]
pub struct RendererSettings {
    // === Core Pipeline Configuration ===
    /// Shading path selected when the renderer starts.
    pub initial_path: ShadingPath,

    /// Enable vertical synchronization (VSync).
    pub vsync: bool,

    // === GPU / Backend Configuration ===
    /// Force a specific wgpu backend (Vulkan, Metal, DX12, …).
    ///
    /// `None` lets wgpu choose the best available backend for the platform.
    pub backends: Option<wgpu::Backends>,

    /// GPU adapter selection preference.
    pub power_preference: wgpu::PowerPreference,

    // === Rendering Defaults ===
    /// Background clear color of the swapchain.
    pub clear_color: wgpu::Color,

    /// Depth buffer texture format shared by the swapchain depth, the G-buffer
    /// and the capture target.
    pub depth_format: wgpu::TextureFormat,

    /// Seed of the SSAO rotation noise.
    ///
    /// `None` derives one seed per process; set it to make frames reproducible.
    pub ssao_seed: Option<u64>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            initial_path: ShadingPath::default(),
            vsync: true,
            backends: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
            depth_format: wgpu::TextureFormat::Depth32Float,
            ssao_seed: None,
        }
    }
}

impl RendererSettings {
    /// The SSAO noise seed actually used: the configured one or the process seed.
    #[must_use]
    pub fn effective_ssao_seed(&self) -> u64 {
        self.ssao_seed
            .unwrap_or_else(crate::resources::ssao::process_noise_seed)
    }
}
