//! Resolver error types.

use std::path::PathBuf;

use eclipse_common::CommonError;
use thiserror::Error;

/// Errors that abort a resolver run. None of them are retried.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Archive listing for '{path}' is empty")]
    ArchiveEmpty { path: String },

    #[error("Malformed cycle identifier '{identifier}': {reason}")]
    MalformedIdentifier { identifier: String, reason: String },

    #[error("None of the {} candidates for cycle {cycle} are available (tried {})", tried.len(), tried.join(", "))]
    NoMatchingForecast { cycle: String, tried: Vec<String> },

    #[error("Archive request for '{path}' failed: {message}")]
    Archive { path: String, message: String },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write metadata: {0}")]
    Metadata(#[from] CommonError),
}

impl ResolveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ResolveError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn archive(path: &str, message: impl ToString) -> Self {
        ResolveError::Archive {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn malformed(identifier: &str, reason: impl Into<String>) -> Self {
        ResolveError::MalformedIdentifier {
            identifier: identifier.to_string(),
            reason: reason.into(),
        }
    }
}
