//! Resource Rebind Controller
//!
//! Owns the four swappable slots (model, skybox, material, environment) and
//! applies swap requests coming from the UI layer. Every swap decodes first
//! and only then releases the old occupant and uploads the new one, so a bad
//! asset never unbinds what is currently on screen, and two occupants of the
//! same slot never coexist past the swap.
//!
//! Environment swaps are staged: [`request_environment`] only records the
//! request, and the synchronous precompute runs in
//! [`acknowledge_environment_swap`]. Every other swap executes immediately.
//!
//! [`request_environment`]: RebindController::request_environment
//! [`acknowledge_environment_swap`]: RebindController::acknowledge_environment_swap

use crate::assets::image::load_cube_faces;
use crate::assets::material::decode_material;
use crate::assets::{AssetSource, MaterialPreset, MeshLoader};
use crate::errors::Result;
use crate::renderer::core::{GpuContext, Slot, Tracked};
use crate::renderer::frame::FrameLayouts;
use crate::renderer::material::MaterialTextureSet;
use crate::renderer::mesh::GpuMesh;
use crate::renderer::precompute::cubemap::CubemapAsset;
use crate::renderer::precompute::{EnvironmentMaps, EnvironmentSet, PrecomputePipeline};
use crate::renderer::primitives::PrimitiveCache;
use crate::renderer::targets::RenderTargets;

/// Borrows the environment precompute needs.
pub struct PrecomputeContext<'a> {
    pub ctx: &'a GpuContext,
    pub pipeline: &'a PrecomputePipeline,
    pub targets: &'a mut RenderTargets,
    pub primitives: &'a mut PrimitiveCache,
}

#[derive(Default)]
pub struct RebindController {
    model: Slot<GpuMesh>,
    skybox: Slot<Tracked<CubemapAsset>>,
    material: Slot<MaterialTextureSet>,
    environment: EnvironmentMaps,
    pending_environment: Option<AssetSource>,
}

impl RebindController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Immediate swaps ===

    /// Loads `source` through `loader` and makes it the active model.
    pub fn request_model(
        &mut self,
        ctx: &GpuContext,
        layouts: &FrameLayouts,
        loader: &dyn MeshLoader,
        source: &AssetSource,
    ) -> Result<()> {
        let result = self.model.swap(
            || {
                let mesh = loader.load(source)?;
                mesh.validate()?;
                Ok(mesh)
            },
            |mesh| {
                Ok(GpuMesh::upload(
                    ctx,
                    &mesh,
                    &layouts.albedo,
                    &layouts.repeat_sampler,
                ))
            },
        );
        report("model", source, result.map(|mesh| mesh.name.clone()))
    }

    /// Loads the six faces under `source` and makes them the active skybox.
    ///
    /// A missing or mismatched face aborts the swap; the old skybox stays.
    pub fn request_skybox(&mut self, ctx: &GpuContext, source: &AssetSource) -> Result<()> {
        let result = self.skybox.swap(
            || load_cube_faces(source),
            |faces| Ok(CubemapAsset::skybox(ctx, &faces)),
        );
        report("skybox", source, result.map(|cube| format!("{0}x{0}", cube.face_size())))
    }

    /// Decodes the five maps of `preset` and binds them as the PBR material.
    ///
    /// Maps that fail to decode fall back to their neutral default, so this
    /// only fails if the upload itself does.
    pub fn request_material(
        &mut self,
        ctx: &GpuContext,
        layouts: &FrameLayouts,
        preset: &MaterialPreset,
    ) -> Result<()> {
        let result = self.material.swap(
            || Ok(decode_material(preset)),
            |decoded| {
                Ok(MaterialTextureSet::upload(
                    ctx,
                    decoded,
                    &layouts.material,
                    &layouts.repeat_sampler,
                ))
            },
        );
        let source = AssetSource::builtin(&preset.name);
        report(
            "material",
            &source,
            result.map(|set| format!("{} fallback channel(s)", set.fallbacks.len())),
        )
    }

    // === Staged environment swap ===

    /// Stages an environment swap. A later request replaces an earlier one
    /// that was not yet acknowledged.
    pub fn request_environment(&mut self, source: AssetSource) {
        if let Some(previous) = self.pending_environment.replace(source) {
            log::debug!("Replacing staged environment {previous}");
        }
        if let Some(staged) = &self.pending_environment {
            log::info!("Environment {staged} staged; acknowledge to run precompute");
        }
    }

    #[must_use]
    pub fn pending_environment(&self) -> Option<&AssetSource> {
        self.pending_environment.as_ref()
    }

    /// Drops the staged request without touching the active environment.
    pub fn cancel_environment_swap(&mut self) -> Option<AssetSource> {
        self.pending_environment.take()
    }

    /// Runs the staged environment swap, if any.
    ///
    /// Returns `Ok(false)` when nothing was staged. The request is consumed
    /// either way; a failure leaves the previous environment bound.
    pub fn acknowledge_environment_swap(&mut self, pc: PrecomputeContext<'_>) -> Result<bool> {
        let Some(source) = self.pending_environment.take() else {
            return Ok(false);
        };
        self.environment
            .rebuild(pc.ctx, pc.pipeline, pc.targets, pc.primitives, &source)?;
        Ok(true)
    }

    /// Builds the environment immediately, bypassing staging. Used at startup.
    pub fn load_environment(
        &mut self,
        pc: PrecomputeContext<'_>,
        source: &AssetSource,
    ) -> Result<&EnvironmentSet> {
        self.environment
            .rebuild(pc.ctx, pc.pipeline, pc.targets, pc.primitives, source)
    }

    // === Accessors ===

    #[must_use]
    pub fn model(&self) -> Option<&GpuMesh> {
        self.model.get()
    }

    #[must_use]
    pub fn skybox(&self) -> Option<&Tracked<CubemapAsset>> {
        self.skybox.get()
    }

    #[must_use]
    pub fn material(&self) -> Option<&MaterialTextureSet> {
        self.material.get()
    }

    #[must_use]
    pub fn environment(&self) -> Option<&EnvironmentSet> {
        self.environment.current()
    }
}

fn report(slot: &str, source: &AssetSource, result: Result<String>) -> Result<()> {
    match result {
        Ok(detail) => {
            log::debug!("Swapped {slot} to {source} ({detail})");
            Ok(())
        }
        Err(err) => {
            log::error!("Swapping {slot} to {source} failed, keeping the previous one: {err}");
            Err(err)
        }
    }
}
