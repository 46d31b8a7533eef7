//! Error Types
//!
//! This module defines the error types used throughout the viewer.
//!
//! # Overview
//!
//! The main error type [`PrismError`] covers all failure modes including:
//! - GPU initialization failures
//! - Render target allocation failures (the wgpu analogue of an incomplete framebuffer)
//! - Image decoding errors, including non-HDR files handed to the HDR loader
//! - Configuration loading and validation errors
//!
//! None of these are fatal to the frame loop: callers log the error once and keep the
//! previously bound resource active.
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for `std::result::Result<T, PrismError>`.
//!
//! ```rust,ignore
//! use prism::errors::{PrismError, Result};
//!
//! fn load_environment() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::renderer::targets::TargetRole;

/// The main error type for the viewer.
#[derive(Error, Debug)]
pub enum PrismError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create or configure the window surface.
    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(String),

    /// A render target set could not be allocated in a complete state.
    #[error("Incomplete render target {role:?} at {width}x{height}: {reason}")]
    IncompleteTarget {
        /// Semantic role of the offending attachment
        role: TargetRole,
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Why the attachment set cannot be complete
        reason: String,
    },

    /// Copying GPU data back to the CPU failed.
    #[error("Readback failed: {0}")]
    Readback(String),

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    /// A file handed to the HDR loader is not a high dynamic range image.
    #[error("File is not HDR: {0}")]
    NotHdr(String),

    // ========================================================================
    // Parameter & Configuration Errors
    // ========================================================================
    /// A user-supplied parameter was rejected.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Configuration file is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ========================================================================
    // I/O & Platform Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for PrismError {
    fn from(err: image::ImageError) -> Self {
        PrismError::ImageDecodeError(err.to_string())
    }
}

/// Alias for `Result<T, PrismError>`.
pub type Result<T> = std::result::Result<T, PrismError>;
