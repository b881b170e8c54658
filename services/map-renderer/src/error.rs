//! Map renderer error types.

use std::path::PathBuf;

use eclipse_common::CommonError;
use grib2_parser::Grib2Error;
use region::QueryError;
use renderer::RenderError;
use thiserror::Error;

/// Problems with the render configuration record.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing or unreadable file. Recovered by falling back to defaults.
    #[error("Unable to load config file {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Invalid map_bounds: {0}")]
    BoundsConfig(String),

    #[error("Invalid plot_points: {0}")]
    InvalidPoints(String),

    #[error("Invalid filter_query: {0}")]
    InvalidQuery(String),

    #[error("Failed to parse filter_query: {0}")]
    Query(#[from] QueryError),
}

impl ConfigError {
    /// Whether the run can continue with a default configuration.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ConfigError::Load { .. })
    }
}

/// Errors that abort a map rendering run.
#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load {what}: {source}")]
    Input {
        what: &'static str,
        #[source]
        source: CommonError,
    },

    #[error("Failed to load forecast: {0}")]
    Forecast(#[from] Grib2Error),

    #[error("Failed to render map: {0}")]
    Render(#[from] RenderError),

    #[error("Failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MapError {
    pub(crate) fn input(what: &'static str, source: CommonError) -> Self {
        MapError::Input { what, source }
    }
}
