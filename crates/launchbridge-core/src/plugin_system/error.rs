//! # Launchbridge Plugin System Errors
//!
//! [`PluginSystemError`] covers every failure of the bootstrap pass that aborts
//! it: an incompatible host, a missing registry, a classpath that cannot be
//! extended, a service that cannot be resolved, and a registry insertion that
//! the host refused. Duplicate registrations and auxiliary patch failures are
//! not errors and never appear here.
use std::path::PathBuf;

use crate::host::HostError;
use crate::plugin_system::traits::ServiceKind;
use crate::plugin_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Host API version {actual} is not compatible, {required} or later is required")]
    Incompatible { required: String, actual: String },

    #[error("Launch plugin registry is unavailable")]
    RegistryUnavailable,

    #[error("Failed to append '{location}' to the class path: {source}", location = .location.display())]
    ClasspathExtension {
        location: PathBuf,
        #[source]
        source: HostError,
    },

    #[error("Failed to resolve '{qualified_name}': {reason}")]
    ClassResolution {
        qualified_name: String,
        reason: ResolutionFailure,
    },

    #[error("Failed to register '{plugin_id}': {source}")]
    Registration {
        plugin_id: String,
        #[source]
        source: HostError,
    },

    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] VersionError),
}

/// Why a service could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionFailure {
    #[error("no constructor is registered under this name")]
    NotFound,
    #[error("registered as a {actual} but requested as a {requested}")]
    KindMismatch {
        requested: ServiceKind,
        actual: ServiceKind,
    },
    #[error("construction failed: {0}")]
    Construction(String),
    #[error("construction panicked: {0}")]
    Panicked(String),
}

impl PluginSystemError {
    pub fn resolution(qualified_name: &str, reason: ResolutionFailure) -> Self {
        PluginSystemError::ClassResolution {
            qualified_name: qualified_name.to_string(),
            reason,
        }
    }
}
