use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::host::{ArgumentBuilder, Environment, Host, OptionValues};
use crate::kernel::bootstrap::{BootstrapState, Bootstrapper, BridgePhase};
use crate::kernel::error::{Error, Result};
use crate::plugin_system::registrar::PluginRegistrar;
use crate::plugin_system::resolver::ServiceFactory;
use crate::plugin_system::traits::{ScanResource, TransformationService, Transformer};

/// The transformation service the host registers and calls.
///
/// Its `on_load` runs the bootstrap pass once. After a successful pass every
/// other lifecycle call is forwarded to the downstream transformation services
/// in the order they were resolved; calls returning lists return the
/// concatenation of what each service returned.
pub struct BridgeService<H: Host> {
    host: H,
    config: BridgeConfig,
    factory: ServiceFactory,
    registrar: PluginRegistrar,
    artifact: PathBuf,
    state: BootstrapState,
}

impl<H: Host> BridgeService<H> {
    /// Bridge with the default configuration and post registration hooks.
    ///
    /// `artifact` is the location of the bridge's own artifact on disk.
    pub fn new(host: H, factory: ServiceFactory, artifact: impl Into<PathBuf>) -> Self {
        Self {
            host,
            config: BridgeConfig::default(),
            factory,
            registrar: PluginRegistrar::with_default_hooks(),
            artifact: artifact.into(),
            state: BootstrapState::new(),
        }
    }

    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_registrar(mut self, registrar: PluginRegistrar) -> Self {
        self.registrar = registrar;
        self
    }

    pub fn phase(&self) -> BridgePhase {
        self.state.phase()
    }

    pub fn state(&self) -> &BootstrapState {
        &self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    /// Names of the downstream transformation services, in delegation order.
    pub fn downstream_services(&self) -> Vec<&str> {
        self.state.service_names()
    }

    fn fail(&mut self, message: String) -> Error {
        log::error!("Bootstrap failed: {}", message);
        self.state.fail(message.clone());
        Error::IncompatibleEnvironment { message, source: None }
    }
}

impl<H: Host + 'static> TransformationService for BridgeService<H> {
    fn name(&self) -> &str {
        &self.config.bridge_name
    }

    fn arguments(&mut self, builder: &mut dyn ArgumentBuilder) {
        for service in self.state.services_mut() {
            service.arguments(builder);
        }
    }

    fn argument_values(&mut self, values: &dyn OptionValues) {
        for service in self.state.services_mut() {
            service.argument_values(values);
        }
    }

    fn initialize(&mut self, environment: &mut dyn Environment) {
        for service in self.state.services_mut() {
            service.initialize(environment);
        }
    }

    fn begin_scanning(&mut self, environment: &mut dyn Environment) {
        for service in self.state.services_mut() {
            service.begin_scanning(environment);
        }
    }

    fn run_scan(&mut self, environment: &mut dyn Environment) -> Vec<ScanResource> {
        let mut resources = Vec::new();
        for service in self.state.services_mut() {
            resources.extend(service.run_scan(environment));
        }
        resources
    }

    fn on_load(&mut self, environment: &mut dyn Environment, other_services: &BTreeSet<String>) -> Result<()> {
        match self.state.phase() {
            BridgePhase::Uninitialized => {}
            BridgePhase::Failed => {
                let message = self.state.failure().unwrap_or("bootstrap failed").to_string();
                return Err(Error::IncompatibleEnvironment { message, source: None });
            }
            phase => {
                log::debug!("Bootstrap already ran ({}), nothing to do", phase);
                return Ok(());
            }
        }

        if self.host.find_launch_plugin(&self.config.well_known_plugin).is_some() {
            log::debug!("{} launch plugin detected, skipping bootstrap", self.config.well_known_plugin);
            self.state.bypass();
            return Ok(());
        }

        self.state.begin();
        let bootstrapper = Bootstrapper::new(&self.config, &self.factory, &self.registrar, &self.artifact);
        if let Err(e) = bootstrapper.run(&mut self.host, &mut self.state) {
            log::error!("Bootstrap failed: {}", e);
            self.state.fail(e.to_string());
            return Err(Error::incompatible(e));
        }

        let mut downstream_failure = None;
        for service in self.state.services_mut() {
            if let Err(e) = service.on_load(environment, other_services) {
                downstream_failure = Some(format!("{} failed to load: {}", service.name(), e));
                break;
            }
        }
        if let Some(message) = downstream_failure {
            return Err(self.fail(message));
        }

        self.state.complete();
        log::debug!(
            "{} ready with {} downstream service(s)",
            self.config.bridge_name,
            self.state.services().len()
        );
        Ok(())
    }

    fn transformers(&mut self) -> Vec<Arc<dyn Transformer>> {
        let mut transformers = Vec::new();
        for service in self.state.services_mut() {
            transformers.extend(service.transformers());
        }
        transformers
    }
}

impl<H: Host + fmt::Debug> fmt::Debug for BridgeService<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeService")
            .field("host", &self.host)
            .field("config", &self.config)
            .field("factory", &self.factory)
            .field("registrar", &self.registrar)
            .field("artifact", &self.artifact)
            .field("state", &self.state)
            .finish()
    }
}
