//! Precompute Pipeline Tests
//!
//! GPU-backed; every test returns early when no adapter is available.
//!
//! Tests for:
//! - Sizes and mip counts of the four derived resources
//! - Determinism of the bake for the same source
//! - BRDF table range
//! - Every mip of the environment and prefiltered cubes is written
//! - Failed rebuilds keep the active environment, oversized sources included
//! - Exactly one environment set is live after repeated swaps

use prism::assets::AssetSource;
use prism::errors::PrismError;
use prism::renderer::core::readback::read_texture;
use prism::renderer::core::{GpuContext, ResourceCategory};
use prism::renderer::precompute::cubemap::{CubemapKind, PREFILTER_MIP_LEVELS};
use prism::renderer::precompute::{BRDF_LUT_SIZE, EnvironmentMaps, PrecomputePipeline};
use prism::renderer::primitives::PrimitiveCache;
use prism::renderer::targets::RenderTargets;
use prism::renderer::RendererSettings;

const DEPTH: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct Rig {
    ctx: GpuContext,
    pipeline: PrecomputePipeline,
    targets: RenderTargets,
    primitives: PrimitiveCache,
    maps: EnvironmentMaps,
}

impl Rig {
    fn new() -> Option<Self> {
        let ctx = pollster::block_on(GpuContext::headless(&RendererSettings::default())).ok()?;
        let pipeline = PrecomputePipeline::new(&ctx, DEPTH);
        let targets = RenderTargets::new(&ctx, 16, 16, DEPTH, 1).ok()?;
        Some(Self {
            ctx,
            pipeline,
            targets,
            primitives: PrimitiveCache::new(),
            maps: EnvironmentMaps::new(),
        })
    }

    fn rebuild(&mut self, source: &str) -> Result<(), PrismError> {
        self.maps
            .rebuild(
                &self.ctx,
                &self.pipeline,
                &mut self.targets,
                &mut self.primitives,
                &AssetSource::from(source),
            )
            .map(|_| ())
    }
}

#[test]
fn derived_resources_have_fixed_sizes() {
    let Some(mut rig) = Rig::new() else { return };
    rig.rebuild("builtin:sky").unwrap();
    let set = rig.maps.current().unwrap();

    assert_eq!(set.environment.face_size(), 512);
    assert_eq!(set.environment.mip_level_count(), 10);
    assert_eq!(set.irradiance.face_size(), 32);
    assert_eq!(set.irradiance.mip_level_count(), 1);
    assert_eq!(set.prefiltered.face_size(), 128);
    assert_eq!(set.prefiltered.mip_level_count(), PREFILTER_MIP_LEVELS);
    assert_eq!(set.max_reflection_lod(), 4.0);
    assert_eq!(set.brdf_lut.texture.width(), BRDF_LUT_SIZE);
    assert_eq!(set.brdf_lut.texture.height(), BRDF_LUT_SIZE);
}

#[test]
fn bake_is_deterministic() {
    let Some(mut rig) = Rig::new() else { return };

    rig.rebuild("builtin:studio").unwrap();
    let first = {
        let set = rig.maps.current().unwrap();
        (
            read_texture(&rig.ctx, &set.irradiance.texture, 0, 0).unwrap(),
            read_texture(&rig.ctx, &set.prefiltered.texture, 2, PREFILTER_MIP_LEVELS - 1).unwrap(),
            read_texture(&rig.ctx, &set.brdf_lut.texture, 0, 0).unwrap(),
        )
    };

    rig.rebuild("builtin:studio").unwrap();
    let set = rig.maps.current().unwrap();
    assert_eq!(read_texture(&rig.ctx, &set.irradiance.texture, 0, 0).unwrap(), first.0);
    assert_eq!(
        read_texture(&rig.ctx, &set.prefiltered.texture, 2, PREFILTER_MIP_LEVELS - 1).unwrap(),
        first.1
    );
    assert_eq!(read_texture(&rig.ctx, &set.brdf_lut.texture, 0, 0).unwrap(), first.2);
}

#[test]
fn prefiltered_mips_are_all_written() {
    let Some(mut rig) = Rig::new() else { return };
    rig.rebuild("builtin:sky").unwrap();
    let set = rig.maps.current().unwrap();

    for mip in 0..PREFILTER_MIP_LEVELS {
        let texels = read_texture(&rig.ctx, &set.prefiltered.texture, 0, mip).unwrap();
        let size = (128 >> mip) as usize;
        assert_eq!(texels.len(), size * size * 4);
        assert!(texels.iter().all(|v| v.is_finite()));
        assert!(texels.iter().any(|v| *v > 0.0), "mip {mip} is black");
    }
}

#[test]
fn environment_mip_chain_reaches_one_texel() {
    let Some(mut rig) = Rig::new() else { return };
    rig.rebuild("builtin:sky").unwrap();
    let set = rig.maps.current().unwrap();

    let last = set.environment.mip_level_count() - 1;
    for face in 0..6 {
        let top = read_texture(&rig.ctx, &set.environment.texture, face, 0).unwrap();
        let texel = read_texture(&rig.ctx, &set.environment.texture, face, last).unwrap();
        assert_eq!(texel.len(), 4);
        assert!(texel[..3].iter().any(|v| *v > 0.0), "face {face} mip {last} is black");

        // The 1×1 level averages the face, so it stays within the face's range.
        let max = top.iter().copied().fold(0.0_f32, f32::max);
        assert!(texel[..3].iter().all(|v| *v <= max + 1e-3));
    }
}

#[test]
fn brdf_table_stays_in_unit_range() {
    let Some(mut rig) = Rig::new() else { return };
    rig.rebuild("builtin:sky").unwrap();
    let set = rig.maps.current().unwrap();

    let texels = read_texture(&rig.ctx, &set.brdf_lut.texture, 0, 0).unwrap();
    assert_eq!(texels.len(), (BRDF_LUT_SIZE * BRDF_LUT_SIZE * 2) as usize);
    assert!(texels.iter().all(|v| (0.0..=1.01).contains(v)));
}

#[test]
fn repeated_swaps_keep_one_live_set() {
    let Some(mut rig) = Rig::new() else { return };
    rig.rebuild("builtin:sky").unwrap();
    rig.rebuild("builtin:studio").unwrap();
    rig.rebuild("builtin:sky").unwrap();

    let ledger = &rig.ctx.ledger;
    for kind in [
        CubemapKind::EnvironmentCapture,
        CubemapKind::Irradiance,
        CubemapKind::Prefiltered,
    ] {
        assert_eq!(ledger.live(ResourceCategory::Cubemap(kind)), 1, "{kind:?}");
        assert_eq!(ledger.allocations(ResourceCategory::Cubemap(kind)), 3, "{kind:?}");
    }
    assert_eq!(ledger.live(ResourceCategory::BrdfLut), 1);
    // The capture depth is released once the bake is done.
    assert!(rig.targets.is_complete());
    assert_eq!(ledger.live(ResourceCategory::RenderTarget), 7);
}

#[test]
fn failed_rebuild_keeps_active_environment() {
    let Some(mut rig) = Rig::new() else { return };
    rig.rebuild("builtin:sky").unwrap();

    let err = rig.rebuild("builtin:no-such-environment").unwrap_err();
    assert!(matches!(err, PrismError::AssetNotFound(_)));

    let err = rig.rebuild("/nonexistent/loft.hdr").unwrap_err();
    assert!(matches!(err, PrismError::IoError(_) | PrismError::AssetNotFound(_)));

    let set = rig.maps.current().unwrap();
    assert_eq!(set.source, AssetSource::builtin("sky"));
    assert_eq!(rig.ctx.ledger.live(ResourceCategory::BrdfLut), 1);
}

#[test]
fn non_hdr_file_is_rejected() {
    let Some(mut rig) = Rig::new() else { return };
    let path = std::env::temp_dir().join(format!("prism-not-hdr-{}.png", std::process::id()));
    image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]))
        .save(&path)
        .unwrap();

    let result = rig.rebuild(path.to_str().unwrap());
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(result.unwrap_err(), PrismError::NotHdr(_)));
    assert!(rig.maps.current().is_none());
}

#[test]
fn oversized_source_keeps_active_environment() {
    let Some(mut rig) = Rig::new() else { return };
    rig.rebuild("builtin:sky").unwrap();

    let width = rig.ctx.max_texture_dimension() + 8;
    let path = std::env::temp_dir().join(format!("prism-wide-{}.hdr", std::process::id()));
    image::Rgb32FImage::from_pixel(width, 2, image::Rgb([1.0, 0.5, 0.25]))
        .save(&path)
        .unwrap();

    let result = rig.rebuild(path.to_str().unwrap());
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(
        result.unwrap_err(),
        PrismError::InvalidParameter { name: "environment.source", .. }
    ));
    let set = rig.maps.current().unwrap();
    assert_eq!(set.source, AssetSource::builtin("sky"));
    assert_eq!(rig.ctx.ledger.live(ResourceCategory::BrdfLut), 1);
    assert_eq!(
        rig.ctx
            .ledger
            .live(ResourceCategory::Cubemap(CubemapKind::Prefiltered)),
        1
    );
}
