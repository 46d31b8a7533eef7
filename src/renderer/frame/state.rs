//! Shading path selection and path-local parameters.

use serde::Deserialize;

use crate::errors::Result;
use crate::resources::ssao::{SsaoParams, checked};

/// The three mutually exclusive pass sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingPath {
    /// Single forward pass plus skybox.
    Forward,
    /// G-buffer, optional SSAO, full-screen lighting.
    Deferred,
    /// Split-sum image-based lighting plus environment background.
    #[default]
    Pbr,
}

impl ShadingPath {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Forward => "Forward",
            Self::Deferred => "Deferred",
            Self::Pbr => "PBR",
        }
    }
}

/// Light model of the forward path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightMode {
    /// Position + constant/linear/quadratic attenuation.
    #[default]
    Point,
    /// Direction only.
    Directional,
}

impl LightMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Point => Self::Directional,
            Self::Directional => Self::Point,
        }
    }
}

/// Everything the frame selector reads once per frame.
///
/// Mutated only through the setters below; numeric setters validate and clamp.
#[derive(Debug, Clone)]
pub struct ShadingPathState {
    path: ShadingPath,

    // Forward
    blinn: bool,
    light_mode: LightMode,

    // Deferred
    ssao_enabled: bool,
    ssao: SsaoParams,

    // PBR
    metallic: f32,
    roughness: f32,
    probe_sphere: bool,
}

impl Default for ShadingPathState {
    fn default() -> Self {
        Self::new(ShadingPath::default())
    }
}

impl ShadingPathState {
    #[must_use]
    pub fn new(path: ShadingPath) -> Self {
        Self {
            path,
            blinn: true,
            light_mode: LightMode::Point,
            ssao_enabled: true,
            ssao: SsaoParams::default(),
            metallic: 1.0,
            roughness: 1.0,
            probe_sphere: false,
        }
    }

    // === Path ===

    #[inline]
    #[must_use]
    pub fn path(&self) -> ShadingPath {
        self.path
    }

    pub fn set_path(&mut self, path: ShadingPath) {
        if self.path != path {
            log::debug!("Shading path {} -> {}", self.path.label(), path.label());
            self.path = path;
        }
    }

    // === Forward ===

    #[inline]
    #[must_use]
    pub fn blinn(&self) -> bool {
        self.blinn
    }

    pub fn set_blinn(&mut self, blinn: bool) {
        self.blinn = blinn;
    }

    #[inline]
    #[must_use]
    pub fn light_mode(&self) -> LightMode {
        self.light_mode
    }

    pub fn set_light_mode(&mut self, mode: LightMode) {
        self.light_mode = mode;
    }

    // === Deferred ===

    #[inline]
    #[must_use]
    pub fn ssao_enabled(&self) -> bool {
        self.ssao_enabled
    }

    pub fn set_ssao_enabled(&mut self, enabled: bool) {
        self.ssao_enabled = enabled;
    }

    #[inline]
    #[must_use]
    pub fn ssao(&self) -> &SsaoParams {
        &self.ssao
    }

    /// Validated access to the SSAO parameters.
    pub fn ssao_mut(&mut self) -> &mut SsaoParams {
        &mut self.ssao
    }

    // === PBR ===

    #[inline]
    #[must_use]
    pub fn metallic(&self) -> f32 {
        self.metallic
    }

    /// Scales the metallic texture, clamped to `[0, 1]`.
    pub fn set_metallic(&mut self, metallic: f32) -> Result<()> {
        self.metallic = checked("pbr.metallic", metallic, (0.0, 1.0))?;
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    /// Scales the roughness texture, clamped to `[0, 1]`.
    pub fn set_roughness(&mut self, roughness: f32) -> Result<()> {
        self.roughness = checked("pbr.roughness", roughness, (0.0, 1.0))?;
        Ok(())
    }

    /// Whether the PBR path draws the probe sphere instead of the active mesh.
    #[inline]
    #[must_use]
    pub fn probe_sphere(&self) -> bool {
        self.probe_sphere
    }

    pub fn set_probe_sphere(&mut self, enabled: bool) {
        self.probe_sphere = enabled;
    }
}
