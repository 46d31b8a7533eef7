//! Pass sequences of the three shading paths.
//!
//! ```text
//! Forward   ForwardMesh ─► ForwardSkybox
//! Deferred  GeometryBuffer ─► [SsaoOcclusion ─► SsaoBlur] ─► DeferredLighting ─► LightMarkers
//! Pbr       PbrMesh ─► PbrBackground
//! ```
//!
//! A [`FramePlan`] is rebuilt from the [`ShadingPathState`] at the start of
//! every frame, so a toggle made while a frame is recorded only shows up in
//! the next one.

use smallvec::SmallVec;

use crate::renderer::core::DepthMode;
use crate::renderer::frame::state::{ShadingPath, ShadingPathState};
use crate::resources::primitives::PrimitiveKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    ForwardMesh,
    ForwardSkybox,
    GeometryBuffer,
    SsaoOcclusion,
    SsaoBlur,
    DeferredLighting,
    LightMarkers,
    PbrMesh,
    PbrBackground,
}

impl PassKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ForwardMesh => "Forward Mesh",
            Self::ForwardSkybox => "Forward Skybox",
            Self::GeometryBuffer => "Geometry Buffer",
            Self::SsaoOcclusion => "SSAO Occlusion",
            Self::SsaoBlur => "SSAO Blur",
            Self::DeferredLighting => "Deferred Lighting",
            Self::LightMarkers => "Light Markers",
            Self::PbrMesh => "PBR Mesh",
            Self::PbrBackground => "PBR Background",
        }
    }
}

/// Color destination of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassTarget {
    /// The surface texture of the frame.
    Swapchain,
    /// Position, normal and albedo attachments.
    GeometryBuffer,
    SsaoRaw,
    SsaoBlurred,
}

/// Depth attachment of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthAttachment {
    None,
    /// Viewport depth of the forward and PBR paths.
    Scene,
    /// Depth written by the geometry pass.
    GeometryBuffer,
}

/// Whether a pass starts from cleared attachments or builds on the previous pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadPolicy {
    Clear,
    Load,
}

/// Occlusion texture read by the deferred lighting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcclusionSource {
    /// Output of the blur pass.
    Blurred,
    /// 1×1 white texture: no occlusion.
    Neutral,
}

/// One scoped render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassDesc {
    pub kind: PassKind,
    pub target: PassTarget,
    /// Depth test every pipeline bound inside the pass must use.
    pub depth: DepthMode,
    pub depth_attachment: DepthAttachment,
    pub load: LoadPolicy,
}

impl PassDesc {
    const fn new(
        kind: PassKind,
        target: PassTarget,
        depth: DepthMode,
        depth_attachment: DepthAttachment,
        load: LoadPolicy,
    ) -> Self {
        Self {
            kind,
            target,
            depth,
            depth_attachment,
            load,
        }
    }
}

/// Ordered passes of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub path: ShadingPath,
    pub passes: SmallVec<[PassDesc; 6]>,
    /// Meaningful for the deferred path only.
    pub occlusion: OcclusionSource,
    /// PBR draws the probe sphere instead of the active mesh.
    pub probe_sphere: bool,
}

impl FramePlan {
    #[must_use]
    pub fn build(state: &ShadingPathState) -> Self {
        use DepthAttachment as D;
        use LoadPolicy::{Clear, Load};
        use PassKind as K;
        use PassTarget as T;

        let mut passes = SmallVec::new();
        let mut occlusion = OcclusionSource::Neutral;

        match state.path() {
            ShadingPath::Forward => {
                passes.push(PassDesc::new(
                    K::ForwardMesh,
                    T::Swapchain,
                    DepthMode::Less,
                    D::Scene,
                    Clear,
                ));
                passes.push(PassDesc::new(
                    K::ForwardSkybox,
                    T::Swapchain,
                    DepthMode::LessEqual,
                    D::Scene,
                    Load,
                ));
            }
            ShadingPath::Deferred => {
                passes.push(PassDesc::new(
                    K::GeometryBuffer,
                    T::GeometryBuffer,
                    DepthMode::Less,
                    D::GeometryBuffer,
                    Clear,
                ));
                if state.ssao_enabled() {
                    passes.push(PassDesc::new(
                        K::SsaoOcclusion,
                        T::SsaoRaw,
                        DepthMode::Disabled,
                        D::None,
                        Clear,
                    ));
                    passes.push(PassDesc::new(
                        K::SsaoBlur,
                        T::SsaoBlurred,
                        DepthMode::Disabled,
                        D::None,
                        Clear,
                    ));
                    occlusion = OcclusionSource::Blurred;
                }
                passes.push(PassDesc::new(
                    K::DeferredLighting,
                    T::Swapchain,
                    DepthMode::Disabled,
                    D::None,
                    Clear,
                ));
                passes.push(PassDesc::new(
                    K::LightMarkers,
                    T::Swapchain,
                    DepthMode::Less,
                    D::GeometryBuffer,
                    Load,
                ));
            }
            ShadingPath::Pbr => {
                passes.push(PassDesc::new(
                    K::PbrMesh,
                    T::Swapchain,
                    DepthMode::Less,
                    D::Scene,
                    Clear,
                ));
                passes.push(PassDesc::new(
                    K::PbrBackground,
                    T::Swapchain,
                    DepthMode::LessEqual,
                    D::Scene,
                    Load,
                ));
            }
        }

        Self {
            path: state.path(),
            passes,
            occlusion,
            probe_sphere: state.path() == ShadingPath::Pbr && state.probe_sphere(),
        }
    }

    #[must_use]
    pub fn contains(&self, kind: PassKind) -> bool {
        self.passes.iter().any(|p| p.kind == kind)
    }

    /// Primitives the plan draws, to be uploaded before recording.
    #[must_use]
    pub fn required_primitives(&self) -> SmallVec<[PrimitiveKind; 3]> {
        let mut kinds = SmallVec::new();
        for pass in &self.passes {
            let kind = match pass.kind {
                PassKind::ForwardSkybox | PassKind::PbrBackground | PassKind::LightMarkers => {
                    Some(PrimitiveKind::Cube)
                }
                PassKind::SsaoOcclusion | PassKind::SsaoBlur | PassKind::DeferredLighting => {
                    Some(PrimitiveKind::Quad)
                }
                PassKind::PbrMesh if self.probe_sphere => Some(PrimitiveKind::Sphere),
                _ => None,
            };
            if let Some(kind) = kind
                && !kinds.contains(&kind)
            {
                kinds.push(kind);
            }
        }
        kinds
    }
}
