//! Small utilities shared by the app layer.

pub mod fps_counter;

pub use fps_counter::FpsCounter;
