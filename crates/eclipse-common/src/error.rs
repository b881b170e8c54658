//! Error types shared across the pipeline crates.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using CommonError.
pub type CommonResult<T> = Result<T, CommonError>;

/// Errors raised while reading or writing the shared on-disk records.
#[derive(Debug, Error)]
pub enum CommonError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    #[error("Invalid geometry in {layer}: {message}")]
    InvalidGeometry { layer: String, message: String },
}

impl CommonError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CommonError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        CommonError::Json {
            path: path.into(),
            source,
        }
    }
}
