use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use crate::host::{
    ArgumentBuilder, ClasspathExtender, DiscoveryRegistry, Environment, Host, HostError,
    LaunchPluginRegistry, ModListEntry, OptionValues, PropertyValue,
};
use crate::plugin_system::traits::LaunchPlugin;

/// Everything an [`InMemoryHost`] owns. A `None` sequence models a host that
/// does not expose it.
struct HostState {
    api_version: Option<String>,
    properties: BTreeMap<String, PropertyValue>,
    launch_plugins: Option<Vec<(String, Arc<dyn LaunchPlugin>)>>,
    classpath: Vec<PathBuf>,
    classpath_rejection: Option<String>,
    discovery_locations: Option<Vec<PathBuf>>,
    mod_list: Option<Vec<ModListEntry>>,
    excluded_paths: Option<Vec<PathBuf>>,
}

/// Comparable copy of a host's state, used to check that a call mutated nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct HostSnapshot {
    pub properties: BTreeMap<String, PropertyValue>,
    pub launch_plugins: Vec<String>,
    pub classpath: Vec<PathBuf>,
    pub discovery_locations: Vec<PathBuf>,
    pub mod_list: Vec<ModListEntry>,
    pub excluded_paths: Vec<PathBuf>,
}

/// Host implementation backed by plain collections.
///
/// Clones share the same state, so a test can keep one handle for inspection
/// while the bridge owns another. Single threaded, like the startup pass it
/// models.
#[derive(Clone)]
pub struct InMemoryHost {
    state: Rc<RefCell<HostState>>,
}

impl InMemoryHost {
    /// Create a host reporting `api_version` with every sequence available and empty.
    pub fn new(api_version: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(HostState {
                api_version: Some(api_version.into()),
                properties: BTreeMap::new(),
                launch_plugins: Some(Vec::new()),
                classpath: Vec::new(),
                classpath_rejection: None,
                discovery_locations: Some(Vec::new()),
                mod_list: Some(Vec::new()),
                excluded_paths: Some(Vec::new()),
            })),
        }
    }

    /// Create a host that does not report any API version.
    pub fn unversioned() -> Self {
        let host = Self::new("");
        host.state.borrow_mut().api_version = None;
        host
    }

    pub fn with_property(self, key: &str, value: PropertyValue) -> Self {
        self.state.borrow_mut().properties.insert(key.to_string(), value);
        self
    }

    pub fn with_launch_plugin(self, name: &str, plugin: Arc<dyn LaunchPlugin>) -> Self {
        if let Some(plugins) = self.state.borrow_mut().launch_plugins.as_mut() {
            plugins.push((name.to_string(), plugin));
        }
        self
    }

    pub fn with_excluded_path(self, path: impl Into<PathBuf>) -> Self {
        if let Some(paths) = self.state.borrow_mut().excluded_paths.as_mut() {
            paths.push(path.into());
        }
        self
    }

    pub fn with_mod_list_entry(self, entry: ModListEntry) -> Self {
        if let Some(entries) = self.state.borrow_mut().mod_list.as_mut() {
            entries.push(entry);
        }
        self
    }

    pub fn without_launch_plugin_registry(self) -> Self {
        self.state.borrow_mut().launch_plugins = None;
        self
    }

    pub fn without_discovery_locations(self) -> Self {
        self.state.borrow_mut().discovery_locations = None;
        self
    }

    pub fn without_mod_list(self) -> Self {
        self.state.borrow_mut().mod_list = None;
        self
    }

    pub fn without_exclusion_list(self) -> Self {
        self.state.borrow_mut().excluded_paths = None;
        self
    }

    /// Make every classpath extension fail with `message`.
    pub fn rejecting_classpath(self, message: &str) -> Self {
        self.state.borrow_mut().classpath_rejection = Some(message.to_string());
        self
    }

    /// Entries appended to the loader search path, in order.
    pub fn classpath(&self) -> Vec<PathBuf> {
        self.state.borrow().classpath.clone()
    }

    /// Registered launch plugin keys, in registration order.
    pub fn launch_plugin_names(&self) -> Vec<String> {
        self.state
            .borrow()
            .launch_plugins
            .as_ref()
            .map(|plugins| plugins.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> HostSnapshot {
        let state = self.state.borrow();
        HostSnapshot {
            properties: state.properties.clone(),
            launch_plugins: state
                .launch_plugins
                .as_ref()
                .map(|plugins| plugins.iter().map(|(name, _)| name.clone()).collect())
                .unwrap_or_default(),
            classpath: state.classpath.clone(),
            discovery_locations: state.discovery_locations.clone().unwrap_or_default(),
            mod_list: state.mod_list.clone().unwrap_or_default(),
            excluded_paths: state.excluded_paths.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Debug for InMemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("InMemoryHost")
            .field("api_version", &state.api_version)
            .field("launch_plugins", &self.launch_plugin_names())
            .finish_non_exhaustive()
    }
}

impl Environment for InMemoryHost {
    fn property(&self, key: &str) -> Option<PropertyValue> {
        self.state.borrow().properties.get(key).cloned()
    }

    fn compute_property_if_absent(
        &mut self,
        key: &str,
        compute: &mut dyn FnMut() -> PropertyValue,
    ) -> Result<PropertyValue, HostError> {
        let mut state = self.state.borrow_mut();
        let value = state
            .properties
            .entry(key.to_string())
            .or_insert_with(|| compute());
        Ok(value.clone())
    }
}

impl LaunchPluginRegistry for InMemoryHost {
    fn find_launch_plugin(&self, name: &str) -> Option<Arc<dyn LaunchPlugin>> {
        self.state
            .borrow()
            .launch_plugins
            .as_ref()?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, plugin)| plugin.clone())
    }

    fn launch_plugins(&self) -> Result<Vec<(String, Arc<dyn LaunchPlugin>)>, HostError> {
        self.state
            .borrow()
            .launch_plugins
            .clone()
            .ok_or_else(|| HostError::unavailable("launch plugin registry"))
    }

    fn insert_launch_plugin(&mut self, name: &str, plugin: Arc<dyn LaunchPlugin>) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let plugins = state
            .launch_plugins
            .as_mut()
            .ok_or_else(|| HostError::unavailable("launch plugin registry"))?;
        if plugins.iter().any(|(key, _)| key == name) {
            return Err(HostError::KeyOccupied(name.to_string()));
        }
        plugins.push((name.to_string(), plugin));
        Ok(())
    }
}

impl ClasspathExtender for InMemoryHost {
    fn append_to_classpath(&mut self, location: &Path) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if let Some(message) = &state.classpath_rejection {
            return Err(HostError::Rejected {
                operation: "append_to_classpath".to_string(),
                message: message.clone(),
            });
        }
        if !state.classpath.iter().any(|entry| entry == location) {
            state.classpath.push(location.to_path_buf());
        }
        Ok(())
    }
}

impl DiscoveryRegistry for InMemoryHost {
    fn discovery_locations(&self) -> Result<Vec<PathBuf>, HostError> {
        self.state
            .borrow()
            .discovery_locations
            .clone()
            .ok_or_else(|| HostError::unavailable("discovery locations"))
    }

    fn add_discovery_location(&mut self, location: PathBuf) -> Result<(), HostError> {
        self.state
            .borrow_mut()
            .discovery_locations
            .as_mut()
            .ok_or_else(|| HostError::unavailable("discovery locations"))?
            .push(location);
        Ok(())
    }

    fn mod_list(&self) -> Result<Vec<ModListEntry>, HostError> {
        self.state
            .borrow()
            .mod_list
            .clone()
            .ok_or_else(|| HostError::unavailable("mod list"))
    }

    fn add_mod_list_entry(&mut self, entry: ModListEntry) -> Result<(), HostError> {
        self.state
            .borrow_mut()
            .mod_list
            .as_mut()
            .ok_or_else(|| HostError::unavailable("mod list"))?
            .push(entry);
        Ok(())
    }

    fn excluded_paths(&self) -> Result<Vec<PathBuf>, HostError> {
        self.state
            .borrow()
            .excluded_paths
            .clone()
            .ok_or_else(|| HostError::unavailable("exclusion list"))
    }

    fn add_excluded_path(&mut self, path: PathBuf) -> Result<(), HostError> {
        self.state
            .borrow_mut()
            .excluded_paths
            .as_mut()
            .ok_or_else(|| HostError::unavailable("exclusion list"))?
            .push(path);
        Ok(())
    }
}

impl Host for InMemoryHost {
    fn api_version(&self) -> Option<String> {
        self.state.borrow().api_version.clone()
    }
}

/// Records argument declarations in order.
#[derive(Debug, Default, Clone)]
pub struct DeclaredArguments {
    pub entries: Vec<(String, String)>,
}

impl DeclaredArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl ArgumentBuilder for DeclaredArguments {
    fn accepts(&mut self, name: &str, description: &str) {
        self.entries.push((name.to_string(), description.to_string()));
    }
}

/// Argument values keyed by argument name.
#[derive(Debug, Default, Clone)]
pub struct ParsedOptions {
    values: HashMap<String, Vec<String>>,
}

impl ParsedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, name: &str, value: &str) -> Self {
        self.values.entry(name.to_string()).or_default().push(value.to_string());
        self
    }
}

impl OptionValues for ParsedOptions {
    fn value_of(&self, name: &str) -> Option<String> {
        self.values.get(name).and_then(|values| values.first().cloned())
    }

    fn values_of(&self, name: &str) -> Vec<String> {
        self.values.get(name).cloned().unwrap_or_default()
    }
}
