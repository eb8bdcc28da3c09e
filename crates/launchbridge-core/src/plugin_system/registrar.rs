//! Registry insertion and the auxiliary patches that follow it.
//!
//! Only the insertion itself must succeed. Everything after it is a
//! [`PostRegistrationHook`] run inside its own failure boundary: an error or a
//! panic in one hook is logged and the next hook runs anyway.
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::host::{Host, HostError, ModListEntry, PropertyValue};
use crate::kernel::constants;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::locator::CustomFolderLocator;
use crate::plugin_system::traits::LaunchPlugin;
use crate::utils::{artifact_file_name, panic_message};

/// What a hook knows about the registration it follows.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationContext<'a> {
    pub config: &'a BridgeConfig,
    /// Absolute location of the bridge artifact.
    pub artifact: &'a Path,
    /// Key the plugin was registered under.
    pub plugin_name: &'a str,
}

impl RegistrationContext<'_> {
    /// Directory holding the bridge artifact.
    pub fn artifact_dir(&self) -> &Path {
        self.artifact.parent().unwrap_or(self.artifact)
    }

    /// `<artifact dir>/<custom>/<leaf>`
    fn custom_dir(&self, leaf: &str) -> PathBuf {
        self.artifact_dir().join(&self.config.custom_directory).join(leaf)
    }
}

/// Best-effort patch applied after a successful registry insertion.
pub trait PostRegistrationHook {
    fn name(&self) -> &str;

    fn apply(&self, host: &mut dyn Host, context: &RegistrationContext<'_>) -> Result<(), HostError>;
}

/// Registers launch plugins into the host registry and runs the post
/// registration hooks, in order.
pub struct PluginRegistrar {
    hooks: Vec<Box<dyn PostRegistrationHook>>,
}

impl PluginRegistrar {
    /// Registrar without any hooks.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Registrar running the bridge's standard patches: both custom discovery
    /// locators, both custom discovery directories, then the listing row.
    pub fn with_default_hooks() -> Self {
        Self::new()
            .with_hook(ModsLocatorHook)
            .with_hook(PluginsLocatorHook)
            .with_hook(DiscoveryDirectoryHook::plugins())
            .with_hook(DiscoveryDirectoryHook::mods())
            .with_hook(ListingHook)
    }

    pub fn with_hook<H: PostRegistrationHook + 'static>(mut self, hook: H) -> Self {
        self.add_hook(Box::new(hook));
        self
    }

    pub fn add_hook(&mut self, hook: Box<dyn PostRegistrationHook>) {
        self.hooks.push(hook);
    }

    pub fn hook_names(&self) -> Vec<&str> {
        self.hooks.iter().map(|hook| hook.name()).collect()
    }

    /// Insert `plugin` under its own name, then run every hook.
    ///
    /// Fails only when the host refuses the insertion.
    pub fn register(
        &self,
        host: &mut dyn Host,
        plugin: Arc<dyn LaunchPlugin>,
        config: &BridgeConfig,
        artifact: &Path,
    ) -> Result<(), PluginSystemError> {
        let plugin_name = plugin.name().to_string();
        host.insert_launch_plugin(&plugin_name, plugin)
            .map_err(|source| PluginSystemError::Registration {
                plugin_id: plugin_name.clone(),
                source,
            })?;

        let context = RegistrationContext {
            config,
            artifact,
            plugin_name: &plugin_name,
        };
        self.run_hooks(host, &context);
        Ok(())
    }

    /// Run every hook in its own failure boundary. Returns how many failed.
    pub fn run_hooks(&self, host: &mut dyn Host, context: &RegistrationContext<'_>) -> usize {
        let mut failures = 0;
        for hook in &self.hooks {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| hook.apply(&mut *host, context)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    log::warn!("Post registration hook '{}' failed: {}", hook.name(), e);
                }
                Err(payload) => {
                    failures += 1;
                    log::warn!(
                        "Post registration hook '{}' panicked: {}",
                        hook.name(),
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
        failures
    }
}

impl Default for PluginRegistrar {
    fn default() -> Self {
        Self::with_default_hooks()
    }
}

impl fmt::Debug for PluginRegistrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistrar").field("hooks", &self.hook_names()).finish()
    }
}

/// Sets the mods folder factory property to a locator for
/// `<artifact dir>/custom/mods`, unless something is already set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModsLocatorHook;

impl PostRegistrationHook for ModsLocatorHook {
    fn name(&self) -> &str {
        "mods-locator"
    }

    fn apply(&self, host: &mut dyn Host, context: &RegistrationContext<'_>) -> Result<(), HostError> {
        let folder = context.custom_dir(&context.config.custom_mods_directory);
        host.compute_property_if_absent(&context.config.mod_folder_factory_property, &mut || {
            PropertyValue::Locator(Arc::new(CustomFolderLocator::new(
                folder.clone(),
                constants::CUSTOM_MODS_LOCATOR_NAME,
            )))
        })?;
        Ok(())
    }
}

/// Sets the plugins folder factory property to a locator for
/// `<base dir>/custom/plugins`, unless something is already set.
#[derive(Debug, Clone, Copy, Default)]
pub struct PluginsLocatorHook;

impl PostRegistrationHook for PluginsLocatorHook {
    fn name(&self) -> &str {
        "plugins-locator"
    }

    fn apply(&self, host: &mut dyn Host, context: &RegistrationContext<'_>) -> Result<(), HostError> {
        let config = context.config;
        let base_dir = match host.property(&config.base_directory_property) {
            Some(PropertyValue::Path(path)) => path,
            Some(other) => {
                return Err(HostError::PropertyType {
                    key: config.base_directory_property.clone(),
                    expected: "path",
                    actual: other.type_name(),
                });
            }
            None => return Err(HostError::MissingProperty(config.base_directory_property.clone())),
        };
        let folder = base_dir
            .join(&config.custom_directory)
            .join(&config.custom_plugins_directory);
        host.compute_property_if_absent(&config.plugin_folder_factory_property, &mut || {
            PropertyValue::Locator(Arc::new(CustomFolderLocator::new(
                folder.clone(),
                constants::CUSTOM_PLUGINS_LOCATOR_NAME,
            )))
        })?;
        Ok(())
    }
}

/// Appends a custom directory next to the artifact to the host's extra
/// discovery locations, if it is not listed yet.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryDirectoryHook {
    which: CustomFolder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CustomFolder {
    Mods,
    Plugins,
}

impl DiscoveryDirectoryHook {
    pub fn mods() -> Self {
        Self { which: CustomFolder::Mods }
    }

    pub fn plugins() -> Self {
        Self { which: CustomFolder::Plugins }
    }

    fn location(&self, context: &RegistrationContext<'_>) -> PathBuf {
        match self.which {
            CustomFolder::Mods => context.custom_dir(&context.config.custom_mods_directory),
            CustomFolder::Plugins => context.custom_dir(&context.config.custom_plugins_directory),
        }
    }
}

impl PostRegistrationHook for DiscoveryDirectoryHook {
    fn name(&self) -> &str {
        match self.which {
            CustomFolder::Mods => "mods-discovery-directory",
            CustomFolder::Plugins => "plugins-discovery-directory",
        }
    }

    fn apply(&self, host: &mut dyn Host, context: &RegistrationContext<'_>) -> Result<(), HostError> {
        let location = self.location(context);
        if host.discovery_locations()?.contains(&location) {
            return Ok(());
        }
        log::debug!("Adding discovery location {}", location.display());
        host.add_discovery_location(location)
    }
}

/// Adds a listing row for the bridge artifact, once per artifact file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingHook;

impl PostRegistrationHook for ListingHook {
    fn name(&self) -> &str {
        "listing"
    }

    fn apply(&self, host: &mut dyn Host, context: &RegistrationContext<'_>) -> Result<(), HostError> {
        let file = artifact_file_name(context.artifact).unwrap_or_default();
        let listing_type = &context.config.listing_type;
        let listed = host
            .mod_list()?
            .iter()
            .any(|entry| entry.file == file && &entry.kind == listing_type);
        if listed {
            return Ok(());
        }
        host.add_mod_list_entry(ModListEntry::new(context.plugin_name, listing_type.as_str(), file))
    }
}
