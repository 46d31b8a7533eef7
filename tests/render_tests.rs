//! Headless Frame Tests
//!
//! GPU-backed; every test returns early when no adapter is available.
//!
//! Renders full frames of every shading path into an offscreen texture and
//! reads them back.

use glam::{Mat4, Vec3};

use prism::app::Viewer;
use prism::assets::AssetSource;
use prism::config::ViewerConfig;
use prism::renderer::core::readback::read_texture;
use prism::renderer::core::{GpuContext, ResourceCategory};
use prism::renderer::frame::{OcclusionSource, PassKind, ShadingPath};
use prism::renderer::{FrameInputs, Renderer, RendererSettings};

const COLOR: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const SIZE: u32 = 64;
const FRONT: Vec3 = Vec3::new(0.0, 0.0, 4.0);

struct Frame {
    ctx: GpuContext,
    renderer: Renderer,
    surface: wgpu::Texture,
    view: wgpu::TextureView,
    failed_slots: usize,
}

impl Frame {
    fn new() -> Option<Self> {
        Self::with_config(ViewerConfig::default())
    }

    fn with_config(config: ViewerConfig) -> Option<Self> {
        let settings = RendererSettings {
            ssao_seed: Some(11),
            clear_color: wgpu::Color::BLACK,
            ..RendererSettings::default()
        };
        let ctx = pollster::block_on(GpuContext::headless(&settings)).ok()?;
        let mut renderer = Renderer::new(&ctx, settings, COLOR, SIZE, SIZE).ok()?;
        let failed_slots = Viewer::new(config).load_initial(&mut renderer, &ctx);

        let surface = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Surface"),
            size: wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = surface.create_view(&wgpu::TextureViewDescriptor::default());
        Some(Self {
            ctx,
            renderer,
            surface,
            view,
            failed_slots,
        })
    }

    fn inputs(camera_position: Vec3) -> FrameInputs {
        FrameInputs {
            view: Mat4::look_at_rh(camera_position, Vec3::ZERO, Vec3::Y),
            projection: Mat4::perspective_rh(45f32.to_radians(), 1.0, 0.1, 100.0),
            model: Mat4::IDENTITY,
            camera_position,
        }
    }

    fn render(&mut self, path: ShadingPath) -> Vec<f32> {
        self.render_from(path, FRONT)
    }

    fn render_from(&mut self, path: ShadingPath, camera: Vec3) -> Vec<f32> {
        self.renderer.state_mut().set_path(path);
        let plan = self
            .renderer
            .render(&self.ctx, &self.view, &Self::inputs(camera))
            .unwrap();
        assert_eq!(plan.path, path);
        read_texture(&self.ctx, &self.surface, 0, 0).unwrap()
    }
}

fn lit_pixels(texels: &[f32]) -> usize {
    texels
        .chunks_exact(4)
        .filter(|px| px[..3].iter().any(|c| *c > 0.0))
        .count()
}

fn luminance(texels: &[f32]) -> f32 {
    texels
        .chunks_exact(4)
        .map(|px| 0.2126 * px[0] + 0.7152 * px[1] + 0.0722 * px[2])
        .sum()
}

#[test]
fn initial_assets_are_bound() {
    let Some(frame) = Frame::new() else { return };
    assert_eq!(frame.failed_slots, 0);
    let rebind = frame.renderer.rebind();
    assert!(rebind.model().is_some());
    assert!(rebind.skybox().is_some());
    assert!(rebind.material().is_some());
    assert!(rebind.environment().is_some());
}

#[test]
fn failed_initial_slot_is_counted_and_left_empty() {
    let config = ViewerConfig {
        environments: vec![AssetSource::from("/nonexistent/loft.hdr")],
        ..ViewerConfig::default()
    };
    let Some(mut frame) = Frame::with_config(config) else { return };
    assert_eq!(frame.failed_slots, 1);

    let rebind = frame.renderer.rebind();
    assert!(rebind.model().is_some());
    assert!(rebind.skybox().is_some());
    assert!(rebind.material().is_some());
    assert!(rebind.environment().is_none());

    // Paths that do not need an environment still render.
    assert!(lit_pixels(&frame.render(ShadingPath::Forward)) > 0);
}

#[test]
fn every_path_draws_something() {
    let Some(mut frame) = Frame::new() else { return };
    for path in [ShadingPath::Forward, ShadingPath::Deferred, ShadingPath::Pbr] {
        let texels = frame.render(path);
        assert_eq!(texels.len(), (SIZE * SIZE * 4) as usize);
        assert!(lit_pixels(&texels) > 0, "{path:?} produced a black frame");
    }
}

#[test]
fn deferred_frames_are_reproducible_with_fixed_seed() {
    let Some(mut frame) = Frame::new() else { return };
    frame.renderer.state_mut().set_ssao_enabled(true);
    let first = frame.render(ShadingPath::Deferred);
    let second = frame.render(ShadingPath::Deferred);
    assert_eq!(first, second);
}

#[test]
fn ssao_toggle_changes_next_plan() {
    let Some(mut frame) = Frame::new() else { return };
    frame.renderer.state_mut().set_path(ShadingPath::Deferred);

    frame.renderer.state_mut().set_ssao_enabled(false);
    let plan = frame
        .renderer
        .render(&frame.ctx, &frame.view, &Frame::inputs(FRONT))
        .unwrap();
    assert_eq!(plan.occlusion, OcclusionSource::Neutral);
    assert!(!plan.contains(PassKind::SsaoOcclusion));

    frame.renderer.state_mut().set_ssao_enabled(true);
    let plan = frame
        .renderer
        .render(&frame.ctx, &frame.view, &Frame::inputs(FRONT))
        .unwrap();
    assert_eq!(plan.occlusion, OcclusionSource::Blurred);
    assert!(plan.contains(PassKind::SsaoBlur));
}

#[test]
fn ssao_darkens_occluded_geometry() {
    let config = ViewerConfig {
        models: vec![AssetSource::builtin("pair")],
        ..ViewerConfig::default()
    };
    let Some(mut frame) = Frame::with_config(config) else { return };
    assert_eq!(frame.failed_slots, 0);
    let oblique = Vec3::new(2.5, 2.0, 3.0);

    frame.renderer.state_mut().set_ssao_enabled(false);
    let off = luminance(&frame.render_from(ShadingPath::Deferred, oblique));

    frame.renderer.state_mut().set_ssao_enabled(true);
    let on = luminance(&frame.render_from(ShadingPath::Deferred, oblique));
    assert!(off > 0.0);
    assert!(off >= on, "SSAO brightened the frame: off {off}, on {on}");

    let raw = &frame.renderer.targets().ssao().unwrap().raw;
    let occlusion = read_texture(&frame.ctx, &raw.texture, 0, 0).unwrap();
    assert_eq!(occlusion.len(), (SIZE * SIZE) as usize);
    assert!(
        occlusion.iter().any(|v| *v < 1.0),
        "no texel of the raw SSAO target is occluded"
    );
}

#[test]
fn probe_sphere_builds_sphere_once() {
    let Some(mut frame) = Frame::new() else { return };
    frame.renderer.state_mut().set_probe_sphere(true);
    frame.render(ShadingPath::Pbr);
    frame.render(ShadingPath::Pbr);

    // Quad for the BRDF bake, cube for captures, sphere for the probe.
    assert_eq!(
        frame.ctx.ledger.allocations(ResourceCategory::PrimitiveBuffer),
        3
    );
}

#[test]
fn resize_between_frames() {
    let Some(mut frame) = Frame::new() else { return };
    assert!(frame.renderer.resize(&frame.ctx, SIZE * 2, SIZE).unwrap());
    assert_eq!(frame.renderer.targets().size(), (SIZE * 2, SIZE));

    // The surface stays 64×64; only the off-screen targets follow the resize.
    frame.renderer.resize(&frame.ctx, SIZE, SIZE).unwrap();
    frame.render(ShadingPath::Deferred);
}
