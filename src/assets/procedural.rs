//! Builtin procedural assets.
//!
//! Lets the viewer run with no files on disk: every `builtin:<name>` source in
//! the default configuration resolves here.

use std::f32::consts::PI;

use glam::Vec3;

use crate::assets::image::{HdrImage, PixelBuffer};

const TEXTURE_SIZE: u32 = 64;
const SKYBOX_FACE_SIZE: u32 = 64;
const ENV_WIDTH: u32 = 256;
const ENV_HEIGHT: u32 = 128;

/// Generates a named 2D texture.
///
/// | Name          | Content                                   |
/// |---------------|-------------------------------------------|
/// | `white`       | solid white                               |
/// | `black`       | solid black                               |
/// | `flat_normal` | tangent-space +Z normal `(0.5, 0.5, 1)`   |
/// | `checker`     | 8×8 warm/cool checkerboard                |
/// | `brushed`     | horizontal roughness streaks              |
/// | `gradient`    | left-to-right ramp, dark to bright        |
#[must_use]
pub fn texture(name: &str) -> Option<PixelBuffer> {
    let n = TEXTURE_SIZE;
    let buf = match name {
        "white" => PixelBuffer::solid(n, n, [255, 255, 255, 255]),
        "black" => PixelBuffer::solid(n, n, [0, 0, 0, 255]),
        "flat_normal" => PixelBuffer::solid(n, n, [128, 128, 255, 255]),
        "checker" => from_fn(n, n, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                [200, 120, 70, 255]
            } else {
                [60, 90, 140, 255]
            }
        }),
        "brushed" => from_fn(n, n, |_, y| {
            let v = 90 + ((y * 37) % 11) as u8 * 12;
            [v, v, v, 255]
        }),
        "gradient" => from_fn(n, n, |x, _| {
            let v = (x * 255 / (n - 1)) as u8;
            [v, v, v, 255]
        }),
        _ => return None,
    };
    Some(buf)
}

fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> PixelBuffer {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&f(x, y));
        }
    }
    PixelBuffer {
        width,
        height,
        data,
    }
}

/// Generates a named equirectangular HDR environment.
///
/// `sky` is a blue gradient with a bright sun; `studio` is a dim room lit by
/// two large emissive panels.
#[must_use]
pub fn environment(name: &str) -> Option<HdrImage> {
    let radiance: fn(Vec3) -> Vec3 = match name {
        "sky" => sky_radiance,
        "studio" => studio_radiance,
        _ => return None,
    };

    let mut data = Vec::with_capacity((ENV_WIDTH * ENV_HEIGHT * 4) as usize);
    for y in 0..ENV_HEIGHT {
        for x in 0..ENV_WIDTH {
            let u = (x as f32 + 0.5) / ENV_WIDTH as f32;
            let v = (y as f32 + 0.5) / ENV_HEIGHT as f32;
            let dir = equirect_direction(u, v);
            let c = radiance(dir);
            data.extend_from_slice(&[c.x, c.y, c.z, 1.0]);
        }
    }
    Some(HdrImage {
        width: ENV_WIDTH,
        height: ENV_HEIGHT,
        data,
    })
}

/// Inverse of the `(atan2(z, x), asin(y))` equirect lookup used by the capture shader.
/// `v = 0` is the top row (up).
fn equirect_direction(u: f32, v: f32) -> Vec3 {
    let phi = (u - 0.5) * 2.0 * PI;
    let theta = (0.5 - v) * PI;
    Vec3::new(theta.cos() * phi.cos(), theta.sin(), theta.cos() * phi.sin())
}

fn sky_radiance(dir: Vec3) -> Vec3 {
    let horizon = Vec3::new(0.9, 0.85, 0.8);
    let zenith = Vec3::new(0.15, 0.35, 0.85);
    let ground = Vec3::new(0.12, 0.1, 0.08);

    let base = if dir.y >= 0.0 {
        horizon.lerp(zenith, dir.y.sqrt())
    } else {
        horizon.lerp(ground, (-dir.y).sqrt().min(1.0))
    };

    let sun_dir = Vec3::new(0.4, 0.6, 0.7).normalize();
    let sun = if dir.dot(sun_dir) > 0.995 {
        Vec3::splat(40.0)
    } else {
        Vec3::ZERO
    };
    base + sun
}

fn studio_radiance(dir: Vec3) -> Vec3 {
    let ambient = Vec3::splat(0.05);
    let panel = |center: Vec3, extent: f32| {
        let d = dir - center.normalize();
        d.x.abs() < extent && d.y.abs() < extent && d.z.abs() < extent
    };
    if panel(Vec3::new(1.0, 0.5, 0.0), 0.25) {
        Vec3::new(8.0, 7.5, 7.0)
    } else if panel(Vec3::new(-0.5, 0.7, -1.0), 0.2) {
        Vec3::new(3.0, 4.0, 6.0)
    } else {
        ambient
    }
}

/// Generates the six faces (+X, −X, +Y, −Y, +Z, −Z) of a named LDR skybox.
#[must_use]
pub fn skybox_faces(name: &str) -> Option<[PixelBuffer; 6]> {
    let palette: (Vec3, Vec3, Vec3) = match name {
        "sky" => (
            Vec3::new(0.85, 0.85, 0.8),
            Vec3::new(0.2, 0.4, 0.85),
            Vec3::new(0.25, 0.22, 0.2),
        ),
        "dusk" => (
            Vec3::new(0.95, 0.55, 0.3),
            Vec3::new(0.15, 0.1, 0.35),
            Vec3::new(0.1, 0.08, 0.1),
        ),
        _ => return None,
    };
    let (horizon, zenith, ground) = palette;

    let n = SKYBOX_FACE_SIZE;
    Some(std::array::from_fn(|face| {
        from_fn(n, n, |x, y| {
            let s = (x as f32 + 0.5) / n as f32 * 2.0 - 1.0;
            let t = (y as f32 + 0.5) / n as f32 * 2.0 - 1.0;
            let dir = cube_face_direction(face, s, t);
            let c = if dir.y >= 0.0 {
                horizon.lerp(zenith, dir.y)
            } else {
                horizon.lerp(ground, -dir.y)
            };
            [
                (c.x * 255.0) as u8,
                (c.y * 255.0) as u8,
                (c.z * 255.0) as u8,
                255,
            ]
        })
    }))
}

/// Direction through texel `(s, t)` of a cube face, both in `[-1, 1]` with `t`
/// growing downward.
#[must_use]
pub fn cube_face_direction(face: usize, s: f32, t: f32) -> Vec3 {
    let dir = match face {
        0 => Vec3::new(1.0, -t, -s),
        1 => Vec3::new(-1.0, -t, s),
        2 => Vec3::new(s, 1.0, t),
        3 => Vec3::new(s, -1.0, -t),
        4 => Vec3::new(s, -t, 1.0),
        _ => Vec3::new(-s, -t, -1.0),
    };
    dir.normalize()
}
