/// Name the bridge reports to the host
pub const BRIDGE_NAME: &str = "mixinbootstrap";

/// Bridge version
pub const BRIDGE_VERSION: &str = "0.1.0";

/// Oldest host API contract the bridge works with
pub const MINIMUM_HOST_API_VERSION: &str = "4.0";

/// Launch plugin name that shows the bridged framework is already present
pub const WELL_KNOWN_PLUGIN_NAME: &str = "mixin";

/// Launch plugin of the bridged framework
pub const TARGET_LAUNCH_PLUGIN: &str = "org.spongepowered.asm.launch.MixinLaunchPlugin";

/// Transformation service of the bridged framework
pub const TARGET_TRANSFORMATION_SERVICE: &str = "org.spongepowered.asm.launch.MixinTransformationService";

/// The bridge's own adapter launch plugin
pub const ADAPTER_LAUNCH_PLUGIN: &str = "launchbridge.adapter.BridgeLaunchPlugin";

/// Host property holding the base (game) directory
pub const BASE_DIRECTORY_PROPERTY: &str = "gamedir";

/// Host property holding the custom mods folder locator
pub const MOD_FOLDER_FACTORY_PROPERTY: &str = "modfolderfactory";

/// Host property holding the custom plugins folder locator
pub const PLUGIN_FOLDER_FACTORY_PROPERTY: &str = "pluginfolderfactory";

/// Directory under the base directory scanned for ordinary plugins
pub const WATCHED_DIR_NAME: &str = "mods";

/// Root of the bridge's custom discovery folders
pub const CUSTOM_DIR_NAME: &str = "custom";

/// Custom mods folder, under `CUSTOM_DIR_NAME`
pub const CUSTOM_MODS_DIR_NAME: &str = "mods";

/// Custom plugins folder, under `CUSTOM_DIR_NAME`
pub const CUSTOM_PLUGINS_DIR_NAME: &str = "plugins";

pub const CUSTOM_MODS_LOCATOR_NAME: &str = "Custom Mods";

pub const CUSTOM_PLUGINS_LOCATOR_NAME: &str = "Custom Plugins";

/// Type recorded in the host's mod listing
pub const LISTING_TYPE: &str = "PLUGINSERVICE";
