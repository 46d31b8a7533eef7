//! Uniform blocks written by the frame passes.
//!
//! Every struct mirrors a WGSL struct of the same name; fields are `Vec4` or
//! 16-byte groups of scalars so the Rust and WGSL layouts agree without
//! implicit padding.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::renderer::frame::state::LightMode;
use crate::scene::lights::{
    DirectionalLight, LightRig, MAX_DEFERRED_LIGHTS, PBR_LIGHT_COUNT, PointLight,
};

/// Camera and model matrices, shared by every pass of a frame (group 0).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub model: Mat4,
    /// Inverse-transpose of `model`, for world-space normals.
    pub normal_matrix: Mat4,
    /// Inverse-transpose of `view * model`, for the view-space G-buffer.
    pub view_normal_matrix: Mat4,
    pub camera_position: Vec4,
}

impl FrameUniforms {
    #[must_use]
    pub fn new(view: Mat4, projection: Mat4, model: Mat4, camera_position: Vec3) -> Self {
        Self {
            view,
            projection,
            model,
            normal_matrix: model.inverse().transpose(),
            view_normal_matrix: (view * model).inverse().transpose(),
            camera_position: camera_position.extend(1.0),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuPointLight {
    pub position: Vec4,
    pub color: Vec4,
    /// constant, linear, quadratic, unused
    pub attenuation: Vec4,
}

impl From<&PointLight> for GpuPointLight {
    fn from(light: &PointLight) -> Self {
        Self {
            position: light.position.extend(1.0),
            color: light.color.extend(1.0),
            attenuation: Vec4::new(light.constant, light.linear, light.quadratic, 0.0),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuDirectionalLight {
    pub direction: Vec4,
    pub color: Vec4,
}

impl From<&DirectionalLight> for GpuDirectionalLight {
    fn from(light: &DirectionalLight) -> Self {
        Self {
            direction: light.direction.normalize_or(Vec3::NEG_Y).extend(0.0),
            color: light.color.extend(1.0),
        }
    }
}

pub const LIGHT_MODE_POINT: u32 = 0;
pub const LIGHT_MODE_DIRECTIONAL: u32 = 1;

/// Light block of the forward pass. Only the set matching `mode` is filled;
/// the other one is all zeroes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ForwardLightUniforms {
    pub point: GpuPointLight,
    pub directional: GpuDirectionalLight,
    pub mode: u32,
    pub blinn: u32,
    pub shininess: f32,
    pub ambient: f32,
}

impl ForwardLightUniforms {
    pub const SHININESS: f32 = 32.0;
    pub const AMBIENT: f32 = 0.1;

    #[must_use]
    pub fn new(mode: LightMode, blinn: bool, rig: &LightRig) -> Self {
        let mut uniforms = Self {
            mode: LIGHT_MODE_POINT,
            blinn: u32::from(blinn),
            shininess: Self::SHININESS,
            ambient: Self::AMBIENT,
            ..Zeroable::zeroed()
        };
        match mode {
            LightMode::Point => {
                uniforms.point = (&rig.forward_point).into();
            }
            LightMode::Directional => {
                uniforms.mode = LIGHT_MODE_DIRECTIONAL;
                uniforms.directional = (&rig.forward_directional).into();
            }
        }
        uniforms
    }
}

/// Up to [`MAX_DEFERRED_LIGHTS`] point lights for the lighting and marker passes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DeferredLightUniforms {
    pub lights: [GpuPointLight; MAX_DEFERRED_LIGHTS],
    pub count: u32,
    /// Half-extent of the light marker cubes.
    pub marker_scale: f32,
    pub _pad: [u32; 2],
}

impl DeferredLightUniforms {
    #[must_use]
    pub fn new(lights: &[PointLight]) -> Self {
        let mut uniforms = Self {
            marker_scale: 0.125,
            ..Zeroable::zeroed()
        };
        for (dst, src) in uniforms.lights.iter_mut().zip(lights) {
            *dst = src.into();
        }
        uniforms.count = lights.len().min(MAX_DEFERRED_LIGHTS) as u32;
        uniforms
    }
}

/// Direct lights and material scalars of the PBR pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PbrUniforms {
    pub lights: [GpuPointLight; PBR_LIGHT_COUNT],
    /// Multiplies the sampled metallic map.
    pub metallic: f32,
    /// Multiplies the sampled roughness map.
    pub roughness: f32,
    /// Highest mip of the prefiltered cube.
    pub max_reflection_lod: f32,
    pub _pad: f32,
}

impl PbrUniforms {
    #[must_use]
    pub fn new(rig: &LightRig, metallic: f32, roughness: f32, max_reflection_lod: f32) -> Self {
        Self {
            lights: std::array::from_fn(|i| (&rig.pbr[i]).into()),
            metallic,
            roughness,
            max_reflection_lod,
            _pad: 0.0,
        }
    }
}

pub const TONEMAP_NONE: u32 = 0;
pub const TONEMAP_REINHARD: u32 = 1;

/// Background cube parameters: the forward skybox samples an LDR cube as is,
/// the PBR background samples the HDR environment and tonemaps it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BackgroundUniforms {
    pub lod: f32,
    pub tonemap: u32,
    pub _pad: [f32; 2],
}

impl BackgroundUniforms {
    pub const SKYBOX: Self = Self {
        lod: 0.0,
        tonemap: TONEMAP_NONE,
        _pad: [0.0; 2],
    };
    pub const ENVIRONMENT: Self = Self {
        lod: 0.0,
        tonemap: TONEMAP_REINHARD,
        _pad: [0.0; 2],
    };
}
