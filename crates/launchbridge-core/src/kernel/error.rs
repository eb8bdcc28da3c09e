//! # Launchbridge Kernel Errors
//!
//! [`Error`] is what crosses the bridge's boundary back to the host. Fatal
//! bootstrap failures (incompatible host, classpath extension, service
//! resolution, registry insertion) are all reported as
//! [`Error::IncompatibleEnvironment`], the one signal the host treats as a
//! reason to abort its own startup. The remaining variants wrap subsystem errors
//! for callers that use the crate's building blocks directly.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::ConfigError;
use crate::host::HostError;
use crate::plugin_system::error::PluginSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Incompatible environment: {message}")]
    IncompatibleEnvironment {
        message: String,
        #[source]
        source: Option<PluginSystemError>,
    },

    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

/// Result type for kernel operations
pub type Result<T> = StdResult<T, Error>;

impl Error {
    /// Wrap a fatal bootstrap failure as the host-facing incompatibility signal.
    pub fn incompatible(source: PluginSystemError) -> Self {
        Error::IncompatibleEnvironment {
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub fn is_incompatible(&self) -> bool {
        matches!(self, Error::IncompatibleEnvironment { .. })
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
