//! SSAO Parameter Tests
//!
//! Tests for:
//! - Hemisphere kernel: size, orientation, ease-in scaling, determinism
//! - Rotation noise: tile size, XY-only vectors, seed stability
//! - SsaoParams: validated setters, kernel regeneration, uniform packing

use glam::Vec4;

use prism::errors::PrismError;
use prism::resources::ssao::{
    DEFAULT_KERNEL_SIZE, MAX_KERNEL_SIZE, NOISE_DIM, SsaoParams, generate_ssao_kernel,
    generate_ssao_noise, process_noise_seed,
};
use prism::renderer::RendererSettings;

// ============================================================================
// Kernel
// ============================================================================

#[test]
fn kernel_has_requested_sample_count() {
    assert_eq!(generate_ssao_kernel(16).len(), 16);
    assert_eq!(generate_ssao_kernel(MAX_KERNEL_SIZE).len(), 128);
}

#[test]
fn kernel_samples_lie_in_unit_hemisphere() {
    for sample in generate_ssao_kernel(DEFAULT_KERNEL_SIZE) {
        assert!(sample.z >= 0.0, "sample below the surface: {sample}");
        assert!(sample.truncate().length() <= 1.0 + 1e-5);
        assert_eq!(sample.w, 0.0);
    }
}

#[test]
fn kernel_scale_eases_in_toward_origin() {
    let kernel = generate_ssao_kernel(64);
    // Sample 0 is scaled by lerp(0.1, 1.0, 0) = 0.1.
    assert!(kernel[0].truncate().length() <= 0.1 + 1e-5);
    // The first quarter is scaled by at most lerp(0.1, 1.0, (16/64)^2) ≈ 0.156.
    for sample in &kernel[..16] {
        assert!(sample.truncate().length() <= 0.16);
    }
}

#[test]
fn kernel_is_deterministic() {
    assert_eq!(generate_ssao_kernel(32), generate_ssao_kernel(32));
}

// ============================================================================
// Noise
// ============================================================================

#[test]
fn noise_tile_is_four_by_four_in_tangent_plane() {
    let noise = generate_ssao_noise(7);
    assert_eq!(noise.len(), (NOISE_DIM * NOISE_DIM) as usize);
    for [x, y, z, _] in noise {
        assert!((-1.0..1.0).contains(&x));
        assert!((-1.0..1.0).contains(&y));
        assert_eq!(z, 0.0);
    }
}

#[test]
fn noise_depends_only_on_seed() {
    assert_eq!(generate_ssao_noise(99), generate_ssao_noise(99));
    assert_ne!(generate_ssao_noise(1), generate_ssao_noise(2));
}

#[test]
fn unseeded_settings_share_one_process_seed() {
    let seed = process_noise_seed();
    assert_eq!(process_noise_seed(), seed);

    let settings = RendererSettings::default();
    assert_eq!(settings.ssao_seed, None);
    assert_eq!(settings.effective_ssao_seed(), seed);

    let fixed = RendererSettings {
        ssao_seed: Some(11),
        ..Default::default()
    };
    assert_eq!(fixed.effective_ssao_seed(), 11);
}

// ============================================================================
// SsaoParams
// ============================================================================

#[test]
fn params_defaults() {
    let params = SsaoParams::new();
    assert_eq!(params.kernel_size(), 64);
    assert_eq!(params.radius(), 0.5);
    assert_eq!(params.bias(), 0.025);
    assert_eq!(params.power(), 1.0);
    assert_eq!(params.kernel().len(), 64);
}

#[test]
fn kernel_size_is_clamped_and_regenerates_kernel() {
    let mut params = SsaoParams::new();

    params.set_kernel_size(0);
    assert_eq!(params.kernel_size(), 1);
    assert_eq!(params.kernel().len(), 1);

    params.set_kernel_size(10_000);
    assert_eq!(params.kernel_size(), MAX_KERNEL_SIZE);
    assert_eq!(params.kernel().len(), MAX_KERNEL_SIZE as usize);
}

#[test]
fn finite_values_are_clamped() {
    let mut params = SsaoParams::new();
    params.set_radius(5.0).unwrap();
    params.set_bias(-1.0).unwrap();
    params.set_power(0.0).unwrap();
    assert_eq!(params.radius(), 1.0);
    assert_eq!(params.bias(), 0.0);
    assert_eq!(params.power(), 0.1);
}

#[test]
fn non_finite_values_are_rejected_and_ignored() {
    let mut params = SsaoParams::new();
    let err = params.set_radius(f32::NAN).unwrap_err();
    assert!(matches!(err, PrismError::InvalidParameter { name: "ssao.radius", .. }));
    assert_eq!(params.radius(), 0.5);

    assert!(params.set_power(f32::INFINITY).is_err());
    assert_eq!(params.power(), 1.0);
}

#[test]
fn uniforms_zero_fill_unused_kernel_slots() {
    let mut params = SsaoParams::new();
    params.set_kernel_size(8);
    let uniforms = params.to_uniforms();

    assert_eq!(uniforms.kernel_size, 8);
    assert_eq!(&uniforms.samples[..8], params.kernel());
    assert!(uniforms.samples[8..].iter().all(|s| *s == Vec4::ZERO));
}
