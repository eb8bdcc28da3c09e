//! # Launchbridge Host Boundary
//!
//! The bridge never owns the state it patches. Everything it touches belongs to
//! the host process and is reached through the traits in this module, handed to
//! the bridge when it is constructed.
//!
//! ## Roles
//!
//! - **[`Environment`]**: keyed property store with get and compute-if-absent.
//! - **[`LaunchPluginRegistry`]**: the host's keyed registry of launch plugins.
//! - **[`ClasspathExtender`]**: extends the search path of the host's primary loader.
//! - **[`DiscoveryRegistry`]**: the extra discovery directories, the mod listing
//!   and the exclusion list used by the host's file based plugin discovery.
//! - **[`Host`]**: all of the above plus the host's API contract version.
//!
//! [`memory::InMemoryHost`] is a complete implementation backed by plain
//! collections. It is what the tests run against and what an embedding host can
//! start from.
pub mod error;
pub mod memory;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::plugin_system::locator::CustomFolderLocator;
use crate::plugin_system::traits::LaunchPlugin;

pub use error::HostError;
pub use memory::{DeclaredArguments, InMemoryHost, ParsedOptions};

/// Value stored in the host's property store.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Path(PathBuf),
    Text(String),
    Locator(Arc<CustomFolderLocator>),
}

impl PropertyValue {
    /// Returns the path if this property holds one.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            PropertyValue::Path(path) => Some(path),
            _ => None,
        }
    }

    /// Returns the locator if this property holds one.
    pub fn as_locator(&self) -> Option<&Arc<CustomFolderLocator>> {
        match self {
            PropertyValue::Locator(locator) => Some(locator),
            _ => None,
        }
    }

    /// Short name of the variant, used in type mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Path(_) => "path",
            PropertyValue::Text(_) => "text",
            PropertyValue::Locator(_) => "locator",
        }
    }
}

/// A row of the host's mod listing. Informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModListEntry {
    pub name: String,
    pub kind: String,
    pub file: String,
}

impl ModListEntry {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            file: file.into(),
        }
    }
}

impl fmt::Display for ModListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) from {}", self.name, self.kind, self.file)
    }
}

/// Keyed property store owned by the host.
pub trait Environment {
    /// Read a property.
    fn property(&self, key: &str) -> Option<PropertyValue>;

    /// Store the value produced by `compute` only if `key` has no value yet.
    /// Returns the value now stored under `key`, which is the existing one when
    /// the key was already set.
    fn compute_property_if_absent(
        &mut self,
        key: &str,
        compute: &mut dyn FnMut() -> PropertyValue,
    ) -> Result<PropertyValue, HostError>;
}

/// The host's registry of launch plugins, keyed by plugin name.
pub trait LaunchPluginRegistry {
    /// Look a plugin up by the name it was registered under.
    fn find_launch_plugin(&self, name: &str) -> Option<Arc<dyn LaunchPlugin>>;

    /// Every registered plugin with its key.
    ///
    /// Fails with [`HostError::Unavailable`] when the host does not expose its
    /// registry at all.
    fn launch_plugins(&self) -> Result<Vec<(String, Arc<dyn LaunchPlugin>)>, HostError>;

    /// Insert a plugin under `name`. Implementations must refuse an occupied key
    /// with [`HostError::KeyOccupied`] instead of replacing the existing entry.
    fn insert_launch_plugin(&mut self, name: &str, plugin: Arc<dyn LaunchPlugin>) -> Result<(), HostError>;
}

/// Extends the search path of the loader the host resolves services with.
pub trait ClasspathExtender {
    fn append_to_classpath(&mut self, location: &Path) -> Result<(), HostError>;
}

/// Host-held sequences used by file based plugin discovery.
pub trait DiscoveryRegistry {
    fn discovery_locations(&self) -> Result<Vec<PathBuf>, HostError>;

    fn add_discovery_location(&mut self, location: PathBuf) -> Result<(), HostError>;

    fn mod_list(&self) -> Result<Vec<ModListEntry>, HostError>;

    fn add_mod_list_entry(&mut self, entry: ModListEntry) -> Result<(), HostError>;

    fn excluded_paths(&self) -> Result<Vec<PathBuf>, HostError>;

    fn add_excluded_path(&mut self, path: PathBuf) -> Result<(), HostError>;
}

/// Everything the bridge consumes from its host.
pub trait Host: Environment + LaunchPluginRegistry + ClasspathExtender + DiscoveryRegistry {
    /// Version of the API contract the host implements, if it reports one.
    fn api_version(&self) -> Option<String>;
}

/// Receives argument declarations during the host's argument phase.
pub trait ArgumentBuilder {
    fn accepts(&mut self, name: &str, description: &str);
}

/// Parsed argument values handed back by the host.
pub trait OptionValues {
    fn value_of(&self, name: &str) -> Option<String>;

    fn values_of(&self, name: &str) -> Vec<String>;
}

#[cfg(test)]
mod tests;
