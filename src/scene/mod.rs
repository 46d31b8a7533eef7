//! Viewer-side scene state: the camera, the model placement and the light rig.

pub mod camera;
pub mod lights;
pub mod transform;

pub use camera::FlyCamera;
pub use lights::{DirectionalLight, LightRig, PointLight};
pub use transform::ModelTransform;
