use crate::kernel::constants;
use crate::plugin_system::traits::LaunchPlugin;

/// The bridge's own launch plugin.
///
/// Registered next to the bridged target's launch plugin so the host lists the
/// bridge artifact as a launch plugin of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeLaunchPlugin {
    name: String,
}

impl BridgeLaunchPlugin {
    pub fn new() -> Self {
        Self::named(constants::BRIDGE_NAME)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for BridgeLaunchPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchPlugin for BridgeLaunchPlugin {
    fn name(&self) -> &str {
        &self.name
    }
}
