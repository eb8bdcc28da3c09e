//! # Launchbridge Host Errors
//!
//! [`HostError`] is returned by the host-boundary traits when an operation on
//! host-owned state cannot be carried out.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("'{0}' is not exposed by the host")]
    Unavailable(String),

    #[error("Key '{0}' is already registered")]
    KeyOccupied(String),

    #[error("Property '{0}' is not set")]
    MissingProperty(String),

    #[error("Property '{key}' holds a {actual}, expected a {expected}")]
    PropertyType {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Host rejected '{operation}': {message}")]
    Rejected { operation: String, message: String },

    #[error("I/O error during operation '{operation}' on path '{path}': {source}", path = .path.display())]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl HostError {
    pub fn unavailable(what: impl Into<String>) -> Self {
        HostError::Unavailable(what.into())
    }

    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        HostError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }
}
