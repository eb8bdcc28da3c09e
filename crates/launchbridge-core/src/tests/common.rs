#![cfg(test)]

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use tempfile::TempDir;

use crate::host::{ArgumentBuilder, Environment, InMemoryHost, OptionValues, PropertyValue};
use crate::kernel::constants;
use crate::kernel::error::{Error, Result as KernelResult};
use crate::plugin_system::resolver::ServiceFactory;
use crate::plugin_system::traits::{LaunchPlugin, ScanResource, TransformationService, Transformer};

pub const ARTIFACT_FILE: &str = "launchbridge.jar";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Shared record of lifecycle calls, as `"<service>:<call>"`.
pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

// ===== MOCK LAUNCH PLUGINS =====

/// Stands in for the bridged framework's launch plugin.
#[derive(Debug)]
pub struct TargetLaunchPlugin {
    name: String,
}

impl TargetLaunchPlugin {
    pub fn new() -> Self {
        Self {
            name: constants::WELL_KNOWN_PLUGIN_NAME.to_string(),
        }
    }

    pub fn named(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

impl LaunchPlugin for TargetLaunchPlugin {
    fn name(&self) -> &str {
        &self.name
    }
}

/// An unrelated launch plugin already present in the host.
#[derive(Debug)]
pub struct ForeignLaunchPlugin {
    name: String,
}

impl ForeignLaunchPlugin {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

impl LaunchPlugin for ForeignLaunchPlugin {
    fn name(&self) -> &str {
        &self.name
    }
}

// ===== MOCK TRANSFORMATION SERVICES =====

#[derive(Debug)]
pub struct NamedTransformer(pub String);

impl Transformer for NamedTransformer {
    fn name(&self) -> &str {
        &self.0
    }
}

pub fn transformer_names(transformers: &[Arc<dyn Transformer>]) -> Vec<String> {
    transformers.iter().map(|t| t.name().to_string()).collect()
}

/// Marker types giving [`MockService`] distinct concrete types.
#[derive(Debug)]
pub struct Primary;
#[derive(Debug)]
pub struct Secondary;

/// Transformation service that records every call it receives.
pub struct MockService<M: 'static> {
    name: String,
    transformers: Vec<String>,
    calls: CallLog,
    fail_on_load: bool,
    _marker: PhantomData<M>,
}

impl<M: 'static> MockService<M> {
    pub fn new(name: &str, transformers: &[&str], calls: CallLog) -> Self {
        Self {
            name: name.to_string(),
            transformers: transformers.iter().map(|t| t.to_string()).collect(),
            calls,
            fail_on_load: false,
            _marker: PhantomData,
        }
    }

    pub fn failing_on_load(mut self) -> Self {
        self.fail_on_load = true;
        self
    }

    fn record(&self, call: &str) {
        self.calls.borrow_mut().push(format!("{}:{}", self.name, call));
    }
}

impl<M: 'static> TransformationService for MockService<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn arguments(&mut self, builder: &mut dyn ArgumentBuilder) {
        self.record("arguments");
        builder.accepts(&format!("{}.debug", self.name), "enable debug output");
    }

    fn argument_values(&mut self, values: &dyn OptionValues) {
        let value = values.value_of(&format!("{}.debug", self.name)).unwrap_or_default();
        self.record(&format!("argument_values={}", value));
    }

    fn initialize(&mut self, _environment: &mut dyn Environment) {
        self.record("initialize");
    }

    fn begin_scanning(&mut self, _environment: &mut dyn Environment) {
        self.record("begin_scanning");
    }

    fn run_scan(&mut self, _environment: &mut dyn Environment) -> Vec<ScanResource> {
        self.record("run_scan");
        vec![ScanResource::new(format!("{}-resources", self.name), PathBuf::from(&self.name))]
    }

    fn on_load(&mut self, _environment: &mut dyn Environment, other_services: &BTreeSet<String>) -> KernelResult<()> {
        self.record(&format!("on_load({})", other_services.len()));
        if self.fail_on_load {
            return Err(Error::from(format!("{} refused to load", self.name)));
        }
        Ok(())
    }

    fn transformers(&mut self) -> Vec<Arc<dyn Transformer>> {
        self.record("transformers");
        self.transformers
            .iter()
            .map(|name| Arc::new(NamedTransformer(name.clone())) as Arc<dyn Transformer>)
            .collect()
    }
}

// ===== SETUP HELPERS =====

/// Factory resolving the default descriptors: the target launch plugin named
/// like the well-known plugin, a target transformation service contributing
/// transformers `A` and `B`, and the bridge's own adapter.
pub fn default_factory(calls: &CallLog) -> ServiceFactory {
    let mut factory = ServiceFactory::with_defaults();
    factory.register_launch_plugin(constants::TARGET_LAUNCH_PLUGIN, || {
        Ok(Arc::new(TargetLaunchPlugin::new()) as Arc<dyn LaunchPlugin>)
    });
    let calls = calls.clone();
    factory.register_transformation_service(constants::TARGET_TRANSFORMATION_SERVICE, move || {
        Ok(Box::new(MockService::<Primary>::new("target", &["A", "B"], calls.clone())) as Box<dyn TransformationService>)
    });
    factory
}

/// Scratch game directory with the bridge artifact inside its watched `mods`
/// directory.
pub struct GameDir {
    _temp: TempDir,
    pub base: PathBuf,
    pub artifact: PathBuf,
}

impl GameDir {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let base = fs::canonicalize(temp.path()).expect("Failed to canonicalize temp dir");
        let watched = base.join(constants::WATCHED_DIR_NAME);
        fs::create_dir_all(&watched).expect("Failed to create watched dir");
        let artifact = watched.join(ARTIFACT_FILE);
        fs::write(&artifact, b"bridge").expect("Failed to write artifact");
        Self {
            _temp: temp,
            base,
            artifact,
        }
    }

    /// Watched path of the artifact, which the exclusion patch appends.
    pub fn candidate(&self) -> PathBuf {
        self.base.join(constants::WATCHED_DIR_NAME).join(ARTIFACT_FILE)
    }

    /// Host at the minimum API version with this directory as its base directory.
    pub fn host(&self) -> InMemoryHost {
        InMemoryHost::new(constants::MINIMUM_HOST_API_VERSION)
            .with_property(constants::BASE_DIRECTORY_PROPERTY, PropertyValue::Path(self.base.clone()))
    }
}
