//! SSAO (Screen Space Ambient Occlusion) Configuration
//!
//! Pure data: the user-tunable SSAO parameters, the GPU uniform block they are
//! packed into, and the CPU generators for the hemisphere kernel and the 4×4
//! rotation noise tile. The render pass in
//! [`crate::renderer::frame::deferred`] only uploads what lives here.
//!
//! # Algorithm
//!
//! 1. A hemisphere sample kernel (64 samples at startup, up to
//!    [`MAX_KERNEL_SIZE`]) with samples pulled toward the origin by an ease-in
//!    curve `lerp(0.1, 1.0, (i / n)^2)`
//! 2. A 4×4 tiled rotation noise texture that randomizes the kernel orientation
//!    per pixel
//! 3. Range-checked occlusion raised to a contrast `power`
//! 4. A fixed 4×4 box blur over the raw occlusion

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::errors::{PrismError, Result};

/// Capacity of the kernel array in the uniform block; also the kernel size ceiling.
pub const MAX_KERNEL_SIZE: u32 = 128;

/// Kernel size used at startup.
pub const DEFAULT_KERNEL_SIZE: u32 = 64;

/// Edge length of the square rotation noise tile.
pub const NOISE_DIM: u32 = 4;

/// Fixed seed of the hemisphere kernel: the kernel is stable across runs.
const KERNEL_SEED: u64 = 42;

// ============================================================================
// GPU Uniform Struct
// ============================================================================

/// Uniform block consumed by `ssao.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SsaoUniforms {
    pub samples: [Vec4; MAX_KERNEL_SIZE as usize],
    pub kernel_size: u32,
    pub radius: f32,
    pub bias: f32,
    pub power: f32,
}

// ============================================================================
// SsaoParams
// ============================================================================

/// User-facing SSAO parameters.
///
/// All setters validate their input: non-finite values are rejected with
/// [`PrismError::InvalidParameter`] and leave the current value untouched,
/// finite values are clamped into range. Nothing reaches the shader unchecked.
///
/// | Parameter     | Range       | Default |
/// |---------------|-------------|---------|
/// | `kernel_size` | 1..=128     | 64      |
/// | `radius`      | 0.0..=1.0   | 0.5     |
/// | `bias`        | 0.0..=1.0   | 0.025   |
/// | `power`       | 0.1..=10.0  | 1.0     |
#[derive(Debug, Clone)]
pub struct SsaoParams {
    kernel_size: u32,
    radius: f32,
    bias: f32,
    power: f32,
    kernel: Vec<Vec4>,
}

impl Default for SsaoParams {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_KERNEL_SIZE,
            radius: 0.5,
            bias: 0.025,
            power: 1.0,
            kernel: generate_ssao_kernel(DEFAULT_KERNEL_SIZE),
        }
    }
}

impl SsaoParams {
    pub const RADIUS_RANGE: (f32, f32) = (0.0, 1.0);
    pub const BIAS_RANGE: (f32, f32) = (0.0, 1.0);
    pub const POWER_RANGE: (f32, f32) = (0.1, 10.0);

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of hemisphere samples, clamped to `1..=128`.
    ///
    /// The kernel is regenerated when the count changes.
    pub fn set_kernel_size(&mut self, size: u32) {
        let size = size.clamp(1, MAX_KERNEL_SIZE);
        if size != self.kernel_size {
            self.kernel_size = size;
            self.kernel = generate_ssao_kernel(size);
        }
    }

    #[inline]
    #[must_use]
    pub fn kernel_size(&self) -> u32 {
        self.kernel_size
    }

    /// Sets the sampling radius in view-space units.
    pub fn set_radius(&mut self, radius: f32) -> Result<()> {
        self.radius = checked("ssao.radius", radius, Self::RADIUS_RANGE)?;
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Sets the depth bias that prevents self-occlusion acne.
    pub fn set_bias(&mut self, bias: f32) -> Result<()> {
        self.bias = checked("ssao.bias", bias, Self::BIAS_RANGE)?;
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Sets the exponent applied to the final occlusion term.
    pub fn set_power(&mut self, power: f32) -> Result<()> {
        self.power = checked("ssao.power", power, Self::POWER_RANGE)?;
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn power(&self) -> f32 {
        self.power
    }

    /// The active kernel, `kernel_size` samples long.
    #[must_use]
    pub fn kernel(&self) -> &[Vec4] {
        &self.kernel
    }

    /// Packs the parameters into the shader's uniform block.
    #[must_use]
    pub fn to_uniforms(&self) -> SsaoUniforms {
        let mut samples = [Vec4::ZERO; MAX_KERNEL_SIZE as usize];
        for (dst, src) in samples.iter_mut().zip(&self.kernel) {
            *dst = *src;
        }
        SsaoUniforms {
            samples,
            kernel_size: self.kernel_size,
            radius: self.radius,
            bias: self.bias,
            power: self.power,
        }
    }
}

/// Rejects non-finite input, clamps the rest.
pub(crate) fn checked(name: &'static str, value: f32, (min, max): (f32, f32)) -> Result<f32> {
    if value.is_finite() {
        Ok(value.clamp(min, max))
    } else {
        Err(PrismError::InvalidParameter {
            name,
            reason: format!("{value} is not a finite number"),
        })
    }
}

// ============================================================================
// Kernel & Noise Generation
// ============================================================================

/// Generates a hemisphere sample kernel (tangent space, +Z up).
///
/// Uses a fixed seed so the kernel is identical across frames and runs.
#[must_use]
pub fn generate_ssao_kernel(samples: u32) -> Vec<Vec4> {
    let mut rng = StdRng::seed_from_u64(KERNEL_SEED);
    let mut kernel = Vec::with_capacity(samples as usize);

    for i in 0..samples {
        let mut sample = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(0.0..1.0),
        )
        .normalize_or(Vec3::Z);

        sample *= rng.random_range(0.0..1.0f32);

        // Ease-in: cluster samples toward the kernel center.
        let t = i as f32 / samples as f32;
        sample *= lerp(0.1, 1.0, t * t);

        kernel.push(sample.extend(0.0));
    }
    kernel
}

/// Generates the 4×4 rotation noise tile as RGBA float texels.
///
/// Each texel holds a random rotation vector in XY (Z = 0) around the surface
/// normal. The seed is chosen by the caller once per process.
#[must_use]
pub fn generate_ssao_noise(seed: u64) -> Vec<[f32; 4]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..NOISE_DIM * NOISE_DIM)
        .map(|_| {
            [
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                0.0,
                1.0,
            ]
        })
        .collect()
}

/// Per-process noise seed: stable for the lifetime of the process.
#[must_use]
pub fn process_noise_seed() -> u64 {
    use std::sync::OnceLock;

    static SEED: OnceLock<u64> = OnceLock::new();
    *SEED.get_or_init(rand::random::<u64>)
}

fn lerp(a: f32, b: f32, f: f32) -> f32 {
    a + f * (b - a)
}
