//! Error types for GRIB2 decoding.

use std::path::PathBuf;

use projection::ProjectionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Grib2Error {
    #[error("Invalid GRIB2 data: {0}")]
    InvalidFormat(String),

    #[error("Invalid section {section}: {reason}")]
    InvalidSection { section: u8, reason: String },

    #[error("Unsupported template {section}.{template}")]
    UnsupportedTemplate { section: u8, template: u16 },

    #[error("Failed to unpack data: {0}")]
    UnpackingError(String),

    #[error("Field {0} not found in file")]
    FieldNotFound(String),

    #[error("Grid has {expected} points but {actual} values were decoded")]
    GridMismatch { expected: usize, actual: usize },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid grid geometry: {0}")]
    Projection(#[from] ProjectionError),
}
