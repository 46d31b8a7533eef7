//! CPU-side data independent of the GPU: geometry, builtin primitives, SSAO
//! parameters and the per-frame input snapshot.

pub mod geometry;
pub mod input;
pub mod primitives;
pub mod ssao;

pub use geometry::{Geometry, Vertex};
pub use input::InputSnapshot;
pub use primitives::PrimitiveKind;
pub use ssao::SsaoParams;
