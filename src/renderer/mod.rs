//! Renderer
//!
//! [`Renderer`] owns every GPU-side subsystem of the viewer and drives one
//! frame at a time:
//!
//! 1. build the [`FramePlan`] from the current [`ShadingPathState`]
//! 2. make sure the primitives the plan draws are uploaded
//! 3. write the frame uniforms and the per-path uniform blocks
//! 4. open one [`PassScope`] per plan entry and record its draws
//! 5. submit once
//!
//! The renderer never owns the device or the surface. Both come in through a
//! [`GpuContext`] and a color view, so the same code renders into a window or
//! into an off-screen texture.

pub mod core;
pub mod frame;
pub mod material;
pub mod mesh;
pub mod precompute;
pub mod primitives;
pub mod rebind;
pub mod settings;
pub mod targets;

pub use settings::RendererSettings;

use glam::{Mat4, Vec3};
use smallvec::SmallVec;

use crate::assets::{AssetSource, MaterialPreset, MeshLoader};
use crate::errors::{PrismError, Result};
use crate::renderer::core::{GpuContext, UniformBuffer};
use crate::renderer::frame::{
    Background, BackgroundPass, DeferredPasses, DepthAttachment, ForwardPass, FrameLayouts,
    FramePlan, FrameUniforms, PassAttachments, PassDesc, PassKind, PassScope, PassTarget,
    PbrPass, PbrSubject, RecordContext, ShadingPathState,
};
use crate::renderer::precompute::PrecomputePipeline;
use crate::renderer::primitives::PrimitiveCache;
use crate::renderer::rebind::{PrecomputeContext, RebindController};
use crate::renderer::targets::{RenderTargets, TargetRole};
use crate::resources::primitives::PrimitiveKind;
use crate::scene::lights::LightRig;

/// Camera and model state of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    pub view: Mat4,
    pub projection: Mat4,
    pub model: Mat4,
    pub camera_position: Vec3,
}

pub struct Renderer {
    settings: RendererSettings,
    color_format: wgpu::TextureFormat,

    layouts: FrameLayouts,
    frame_uniforms: UniformBuffer<FrameUniforms>,

    targets: RenderTargets,
    primitives: PrimitiveCache,
    precompute: PrecomputePipeline,
    rebind: RebindController,

    state: ShadingPathState,
    lights: LightRig,

    forward: ForwardPass,
    background: BackgroundPass,
    deferred: DeferredPasses,
    pbr: PbrPass,
}

impl Renderer {
    /// Creates every pipeline and allocates the viewport targets at `width × height`.
    pub fn new(
        ctx: &GpuContext,
        settings: RendererSettings,
        color_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let depth_format = settings.depth_format;
        let targets = RenderTargets::new(
            ctx,
            width,
            height,
            depth_format,
            settings.effective_ssao_seed(),
        )?;

        let layouts = FrameLayouts::new(&ctx.device);
        let frame_uniforms = UniformBuffer::new(&ctx.device, "Frame Uniforms", &layouts.frame);
        let forward = ForwardPass::new(ctx, &layouts, color_format, depth_format);
        let background = BackgroundPass::new(ctx, &layouts, color_format, depth_format);
        let deferred = DeferredPasses::new(ctx, &layouts, color_format, depth_format);
        let pbr = PbrPass::new(ctx, &layouts, color_format, depth_format);

        log::info!(
            "Renderer ready: {width}x{height}, {color_format:?}, initial path {}",
            settings.initial_path.label()
        );

        Ok(Self {
            state: ShadingPathState::new(settings.initial_path),
            precompute: PrecomputePipeline::new(ctx, depth_format),
            settings,
            color_format,
            layouts,
            frame_uniforms,
            targets,
            primitives: PrimitiveCache::new(),
            rebind: RebindController::new(),
            lights: LightRig::default(),
            forward,
            background,
            deferred,
            pbr,
        })
    }

    /// Reallocates the viewport targets. See [`RenderTargets::resize`].
    pub fn resize(&mut self, ctx: &GpuContext, width: u32, height: u32) -> Result<bool> {
        self.targets.resize(ctx, width, height)
    }

    // === Swap triggers ===

    pub fn request_model(
        &mut self,
        ctx: &GpuContext,
        loader: &dyn MeshLoader,
        source: &AssetSource,
    ) -> Result<()> {
        self.rebind.request_model(ctx, &self.layouts, loader, source)
    }

    pub fn request_skybox(&mut self, ctx: &GpuContext, source: &AssetSource) -> Result<()> {
        self.rebind.request_skybox(ctx, source)
    }

    pub fn request_material(&mut self, ctx: &GpuContext, preset: &MaterialPreset) -> Result<()> {
        self.rebind.request_material(ctx, &self.layouts, preset)
    }

    /// Stages an environment swap; see [`acknowledge_environment_swap`](Self::acknowledge_environment_swap).
    pub fn request_environment(&mut self, source: AssetSource) {
        self.rebind.request_environment(source);
    }

    /// Runs the staged environment precompute. Stalls until it is done.
    pub fn acknowledge_environment_swap(&mut self, ctx: &GpuContext) -> Result<bool> {
        let pc = PrecomputeContext {
            ctx,
            pipeline: &self.precompute,
            targets: &mut self.targets,
            primitives: &mut self.primitives,
        };
        self.rebind.acknowledge_environment_swap(pc)
    }

    /// Builds the environment right away, without staging.
    pub fn load_environment(&mut self, ctx: &GpuContext, source: &AssetSource) -> Result<()> {
        let pc = PrecomputeContext {
            ctx,
            pipeline: &self.precompute,
            targets: &mut self.targets,
            primitives: &mut self.primitives,
        };
        self.rebind.load_environment(pc, source).map(|_| ())
    }

    // === Frame ===

    /// Records and submits one frame into `surface`.
    ///
    /// Returns the plan that was executed. Passes whose inputs are not bound
    /// yet (no model, no skybox, no environment) still clear their targets
    /// but draw nothing.
    pub fn render(
        &mut self,
        ctx: &GpuContext,
        surface: &wgpu::TextureView,
        inputs: &FrameInputs,
    ) -> Result<FramePlan> {
        if !self.targets.is_complete() {
            let (width, height) = self.targets.size();
            return Err(PrismError::IncompleteTarget {
                role: TargetRole::SceneDepth,
                width,
                height,
                reason: "viewport targets not allocated".to_string(),
            });
        }

        let plan = FramePlan::build(&self.state);
        self.primitives.ensure(ctx, plan.required_primitives());
        self.prepare(ctx, &plan, inputs);

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(plan.path.label()),
            });

        let rc = RecordContext {
            ctx,
            layouts: &self.layouts,
            frame_group: self.frame_uniforms.bind_group(),
        };
        let primitive = |kind| self.primitives.cached(kind).map(|p| &**p);

        for desc in &plan.passes {
            let attachments =
                resolve_attachments(desc, &self.targets, surface, self.settings.clear_color)?;
            let mut scope = PassScope::begin(&mut encoder, *desc, &attachments);

            match desc.kind {
                PassKind::ForwardMesh => self.forward.record(&rc, &mut scope, self.rebind.model()),
                PassKind::ForwardSkybox => {
                    if let (Some(cube), Some(unit_cube)) =
                        (self.rebind.skybox(), primitive(PrimitiveKind::Cube))
                    {
                        self.background
                            .record(&rc, &mut scope, cube, Background::Skybox, unit_cube);
                    }
                }
                PassKind::GeometryBuffer => {
                    self.deferred
                        .record_geometry(&rc, &mut scope, self.rebind.model());
                }
                PassKind::SsaoOcclusion => {
                    if let Some(quad) = primitive(PrimitiveKind::Quad) {
                        self.deferred
                            .record_ssao(&rc, &mut scope, &self.targets, quad);
                    }
                }
                PassKind::SsaoBlur => {
                    if let Some(quad) = primitive(PrimitiveKind::Quad) {
                        self.deferred
                            .record_blur(&rc, &mut scope, &self.targets, quad);
                    }
                }
                PassKind::DeferredLighting => {
                    if let Some(quad) = primitive(PrimitiveKind::Quad) {
                        self.deferred.record_lighting(
                            &rc,
                            &mut scope,
                            &self.targets,
                            plan.occlusion,
                            quad,
                        );
                    }
                }
                PassKind::LightMarkers => {
                    if let Some(unit_cube) = primitive(PrimitiveKind::Cube) {
                        self.deferred.record_markers(&rc, &mut scope, unit_cube);
                    }
                }
                PassKind::PbrMesh => {
                    let subject = if plan.probe_sphere {
                        primitive(PrimitiveKind::Sphere).map(PbrSubject::ProbeSphere)
                    } else {
                        self.rebind.model().map(PbrSubject::Mesh)
                    };
                    if let (Some(environment), Some(material), Some(subject)) =
                        (self.rebind.environment(), self.rebind.material(), subject)
                    {
                        self.pbr
                            .record(&rc, &mut scope, environment, material, subject);
                    }
                }
                PassKind::PbrBackground => {
                    if let (Some(environment), Some(unit_cube)) =
                        (self.rebind.environment(), primitive(PrimitiveKind::Cube))
                    {
                        self.background.record(
                            &rc,
                            &mut scope,
                            &environment.environment,
                            Background::Environment,
                            unit_cube,
                        );
                    }
                }
            }
        }

        ctx.queue.submit(Some(encoder.finish()));
        Ok(plan)
    }

    fn prepare(&mut self, ctx: &GpuContext, plan: &FramePlan, inputs: &FrameInputs) {
        let uniforms = FrameUniforms::new(
            inputs.view,
            inputs.projection,
            inputs.model,
            inputs.camera_position,
        );
        self.frame_uniforms.write(&ctx.queue, &uniforms);

        if plan.contains(PassKind::ForwardMesh) {
            self.forward.prepare(&ctx.queue, &self.state, &self.lights);
        }
        if plan.contains(PassKind::DeferredLighting) {
            self.deferred
                .prepare(&ctx.queue, &self.state, &self.lights.deferred);
        }
        if plan.contains(PassKind::PbrMesh)
            && let Some(environment) = self.rebind.environment()
        {
            self.pbr
                .prepare(&ctx.queue, &self.state, &self.lights, environment);
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn state(&self) -> &ShadingPathState {
        &self.state
    }

    /// Path toggles and parameters; changes apply from the next [`render`](Self::render).
    pub fn state_mut(&mut self) -> &mut ShadingPathState {
        &mut self.state
    }

    #[must_use]
    pub fn rebind(&self) -> &RebindController {
        &self.rebind
    }

    #[must_use]
    pub fn targets(&self) -> &RenderTargets {
        &self.targets
    }

    #[must_use]
    pub fn primitives(&self) -> &PrimitiveCache {
        &self.primitives
    }

    #[must_use]
    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    #[must_use]
    pub fn forward(&self) -> &ForwardPass {
        &self.forward
    }

    #[must_use]
    pub fn deferred(&self) -> &DeferredPasses {
        &self.deferred
    }

    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }
}

/// Picks the attachments and clear color a pass writes.
///
/// G-buffer clears to transparent black (`w = 0` marks uncovered pixels),
/// occlusion targets clear to white (fully unoccluded).
fn resolve_attachments<'a>(
    desc: &PassDesc,
    targets: &'a RenderTargets,
    surface: &'a wgpu::TextureView,
    clear_color: wgpu::Color,
) -> Result<PassAttachments<'a>> {
    let missing = |role: TargetRole| {
        let (width, height) = targets.size();
        PrismError::IncompleteTarget {
            role,
            width,
            height,
            reason: format!("missing for pass {}", desc.kind.label()),
        }
    };

    let (colors, clear_color): (SmallVec<[&wgpu::TextureView; 3]>, _) = match desc.target {
        PassTarget::Swapchain => (SmallVec::from_slice(&[surface]), clear_color),
        PassTarget::GeometryBuffer => {
            let gbuffer = targets.gbuffer().ok_or_else(|| missing(TargetRole::Position))?;
            (
                SmallVec::from_slice(&[
                    &gbuffer.position.view,
                    &gbuffer.normal.view,
                    &gbuffer.albedo.view,
                ]),
                wgpu::Color::TRANSPARENT,
            )
        }
        PassTarget::SsaoRaw => {
            let ssao = targets.ssao().ok_or_else(|| missing(TargetRole::SsaoRaw))?;
            (SmallVec::from_slice(&[&ssao.raw.view]), wgpu::Color::WHITE)
        }
        PassTarget::SsaoBlurred => {
            let ssao = targets.ssao().ok_or_else(|| missing(TargetRole::SsaoBlurred))?;
            (SmallVec::from_slice(&[&ssao.blurred.view]), wgpu::Color::WHITE)
        }
    };

    let depth = match desc.depth_attachment {
        DepthAttachment::None => None,
        DepthAttachment::Scene => Some(
            &targets
                .scene_depth()
                .ok_or_else(|| missing(TargetRole::SceneDepth))?
                .view,
        ),
        DepthAttachment::GeometryBuffer => Some(
            &targets
                .gbuffer()
                .ok_or_else(|| missing(TargetRole::Depth))?
                .depth
                .view,
        ),
    };

    Ok(PassAttachments {
        colors,
        depth,
        clear_color,
    })
}
