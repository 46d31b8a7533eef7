//! Built-in primitive geometry.
//!
//! CPU builders for the three primitives the renderer draws on its own: the
//! full-screen quad, the unit cube (skybox, capture and light markers) and the
//! UV sphere (PBR probe). GPU upload and caching live in
//! [`crate::renderer::primitives`].

mod box_shape;
mod quad;
mod sphere;

pub use box_shape::create_unit_cube;
pub use quad::create_screen_quad;
pub use sphere::{SPHERE_SEGMENTS, create_uv_sphere};

use crate::resources::geometry::Geometry;

/// The primitives known to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Full-screen quad in clip space, drawn as a 4-vertex strip.
    Quad,
    /// Unit cube spanning [-1, 1] on every axis.
    Cube,
    /// Unit-radius UV sphere, 64×64 segments, strip-indexed.
    Sphere,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 3] = [Self::Quad, Self::Cube, Self::Sphere];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Quad => 0,
            Self::Cube => 1,
            Self::Sphere => 2,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Quad => "Screen Quad",
            Self::Cube => "Unit Cube",
            Self::Sphere => "UV Sphere",
        }
    }

    /// Builds the CPU geometry for this primitive.
    #[must_use]
    pub fn build(self) -> Geometry {
        match self {
            Self::Quad => create_screen_quad(),
            Self::Cube => create_unit_cube(),
            Self::Sphere => create_uv_sphere(SPHERE_SEGMENTS, SPHERE_SEGMENTS),
        }
    }
}
