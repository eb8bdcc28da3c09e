//! # Launchbridge Configuration
//!
//! [`BridgeConfig`] carries every name, path fragment and version the bootstrap
//! depends on. Its defaults reproduce the bridge's fixed behaviour, so an empty
//! configuration file (or no file at all) is valid.
//!
//! Configuration files are read as JSON, YAML (`yaml-config` feature) or TOML
//! (`toml-config` feature), chosen by file extension via [`ConfigFormat`].
pub mod error;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::kernel::constants;
use crate::plugin_system::resolver::ServiceDescriptor;
use crate::plugin_system::version::ApiVersion;

pub use error::ConfigError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Settings of the bootstrap bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name the bridge reports to the host.
    pub bridge_name: String,
    /// Launch plugin whose presence means the bridged framework is already loaded.
    pub well_known_plugin: String,
    /// Oldest host API contract version accepted.
    pub minimum_api_version: String,
    /// Host property holding the base directory.
    pub base_directory_property: String,
    /// Directory under the base directory that the host scans for plugins.
    pub watched_directory: String,
    pub custom_directory: String,
    pub custom_mods_directory: String,
    pub custom_plugins_directory: String,
    pub mod_folder_factory_property: String,
    pub plugin_folder_factory_property: String,
    /// Type recorded in the host's mod listing.
    pub listing_type: String,
    /// Whether the bridge artifact is added to the host's exclusion list.
    pub patch_exclusion_list: bool,
    /// Services to resolve, in order.
    pub services: Vec<ServiceDescriptor>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bridge_name: constants::BRIDGE_NAME.to_string(),
            well_known_plugin: constants::WELL_KNOWN_PLUGIN_NAME.to_string(),
            minimum_api_version: constants::MINIMUM_HOST_API_VERSION.to_string(),
            base_directory_property: constants::BASE_DIRECTORY_PROPERTY.to_string(),
            watched_directory: constants::WATCHED_DIR_NAME.to_string(),
            custom_directory: constants::CUSTOM_DIR_NAME.to_string(),
            custom_mods_directory: constants::CUSTOM_MODS_DIR_NAME.to_string(),
            custom_plugins_directory: constants::CUSTOM_PLUGINS_DIR_NAME.to_string(),
            mod_folder_factory_property: constants::MOD_FOLDER_FACTORY_PROPERTY.to_string(),
            plugin_folder_factory_property: constants::PLUGIN_FOLDER_FACTORY_PROPERTY.to_string(),
            listing_type: constants::LISTING_TYPE.to_string(),
            patch_exclusion_list: true,
            services: ServiceDescriptor::defaults(),
        }
    }
}

impl BridgeConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            operation: "read_to_string".to_string(),
            source,
        })?;
        let config = Self::from_str(&content, format)?;
        log::debug!("Loaded bridge configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_str(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let config: BridgeConfig = match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| ConfigError::deserialization("json", e))?,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| ConfigError::deserialization("yaml", e))?,
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| ConfigError::deserialization("toml", e))?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ApiVersion::parse(&self.minimum_api_version).map_err(|e| ConfigError::Invalid {
            field: "minimum_api_version".to_string(),
            message: e.to_string(),
        })?;

        let required = [
            ("bridge_name", &self.bridge_name),
            ("well_known_plugin", &self.well_known_plugin),
            ("base_directory_property", &self.base_directory_property),
            ("watched_directory", &self.watched_directory),
            ("custom_directory", &self.custom_directory),
            ("mod_folder_factory_property", &self.mod_folder_factory_property),
            ("plugin_folder_factory_property", &self.plugin_folder_factory_property),
            ("listing_type", &self.listing_type),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }

        let mut seen = HashSet::new();
        for descriptor in &self.services {
            if descriptor.qualified_name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "services".to_string(),
                    message: "service names must not be empty".to_string(),
                });
            }
            if !seen.insert(descriptor.qualified_name.as_str()) {
                return Err(ConfigError::Invalid {
                    field: "services".to_string(),
                    message: format!("'{}' is listed more than once", descriptor.qualified_name),
                });
            }
        }
        Ok(())
    }
}
