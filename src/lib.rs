#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod app;
pub mod assets;
pub mod config;
pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod utils;

pub use app::{App, Viewer};
pub use config::ViewerConfig;
pub use errors::{PrismError, Result};
pub use renderer::core::{GpuContext, WgpuContext};
pub use renderer::frame::{ShadingPath, ShadingPathState};
pub use renderer::{FrameInputs, Renderer, RendererSettings};
