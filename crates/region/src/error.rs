//! Query parsing errors.

use std::fmt;

use thiserror::Error;

/// The two value kinds a query expression can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Boolean,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Number => write!(f, "number"),
            ValueKind::Boolean => write!(f, "boolean"),
        }
    }
}

/// Errors raised while parsing a filter query.
///
/// Positions are byte offsets into the query string.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Empty query")]
    Empty,

    #[error("Unexpected character '{found}' at {position}")]
    UnexpectedCharacter { position: usize, found: char },

    #[error("Invalid number '{text}' at {position}")]
    InvalidNumber { position: usize, text: String },

    #[error("Unknown field '{name}' at {position} (expected lat, lon or tcc)")]
    UnknownField { position: usize, name: String },

    #[error("Unexpected {found} at {position}, expected {expected}")]
    UnexpectedToken {
        position: usize,
        found: String,
        expected: &'static str,
    },

    #[error("Query ended early, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("Type mismatch at {position}: {operator} needs a {expected}, found a {found}")]
    TypeMismatch {
        position: usize,
        operator: String,
        expected: ValueKind,
        found: ValueKind,
    },
}
