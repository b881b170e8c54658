//! Rendering errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("Failed to load font {path}: {reason}")]
    Font { path: PathBuf, reason: String },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}
