use std::fmt;
use std::path::Path;

use crate::config::BridgeConfig;
use crate::host::Host;
use crate::kernel::constants;
use crate::plugin_system::conflict::DuplicateGuard;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::exclusion::ExclusionPatcher;
use crate::plugin_system::loader::ClasspathExtension;
use crate::plugin_system::registrar::PluginRegistrar;
use crate::plugin_system::resolver::{ResolvedService, ServiceDescriptor, ServiceFactory};
use crate::plugin_system::traits::TransformationService;
use crate::plugin_system::version::CompatibilityGate;

/// Where the bridge is in its one bootstrap pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    Uninitialized,
    Bootstrapping,
    /// Bootstrap succeeded; lifecycle calls are forwarded downstream.
    Ready,
    /// The bridged framework was already present. Terminal.
    Bypassed,
    /// Bootstrap failed. Terminal.
    Failed,
}

impl BridgePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BridgePhase::Ready | BridgePhase::Bypassed | BridgePhase::Failed)
    }
}

impl fmt::Display for BridgePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BridgePhase::Uninitialized => "Uninitialized",
            BridgePhase::Bootstrapping => "Bootstrapping",
            BridgePhase::Ready => "Ready",
            BridgePhase::Bypassed => "Bypassed",
            BridgePhase::Failed => "Failed",
        };
        write!(f, "{}", name)
    }
}

/// Per-process bootstrap state, owned by the facade.
///
/// Downstream transformation services are kept in the order they were first
/// resolved, and every delegated call visits them in that order.
pub struct BootstrapState {
    phase: BridgePhase,
    services: Vec<Box<dyn TransformationService>>,
    classpath: ClasspathExtension,
    failure: Option<String>,
}

impl BootstrapState {
    pub fn new() -> Self {
        Self {
            phase: BridgePhase::Uninitialized,
            services: Vec::new(),
            classpath: ClasspathExtension::new(),
            failure: None,
        }
    }

    pub fn phase(&self) -> BridgePhase {
        self.phase
    }

    /// Description of the failure that ended the pass, once Failed.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn classpath(&self) -> &ClasspathExtension {
        &self.classpath
    }

    pub fn services(&self) -> &[Box<dyn TransformationService>] {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut [Box<dyn TransformationService>] {
        &mut self.services
    }

    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|service| service.name()).collect()
    }

    pub(crate) fn begin(&mut self) {
        self.phase = BridgePhase::Bootstrapping;
    }

    pub(crate) fn complete(&mut self) {
        self.phase = BridgePhase::Ready;
    }

    pub(crate) fn bypass(&mut self) {
        self.phase = BridgePhase::Bypassed;
    }

    /// Enter Failed, dropping every downstream service resolved so far.
    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.phase = BridgePhase::Failed;
        self.services.clear();
        self.failure = Some(message.into());
    }
}

impl Default for BootstrapState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapState")
            .field("phase", &self.phase)
            .field("services", &self.service_names())
            .field("classpath", &self.classpath)
            .field("failure", &self.failure)
            .finish()
    }
}

/// One bootstrap pass: gate, registry check, class path, exclusion patch, then
/// resolve, guard and register every configured service.
///
/// Stops at the first fatal error. Nothing is rolled back; the gate and the
/// registry check run before any mutation.
pub struct Bootstrapper<'a> {
    config: &'a BridgeConfig,
    factory: &'a ServiceFactory,
    registrar: &'a PluginRegistrar,
    artifact: &'a Path,
    guard: DuplicateGuard,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(
        config: &'a BridgeConfig,
        factory: &'a ServiceFactory,
        registrar: &'a PluginRegistrar,
        artifact: &'a Path,
    ) -> Self {
        Self {
            config,
            factory,
            registrar,
            artifact,
            guard: DuplicateGuard::new(),
        }
    }

    pub fn run(&self, host: &mut dyn Host, state: &mut BootstrapState) -> Result<(), PluginSystemError> {
        self.check_compatibility(&*host)?;

        host.launch_plugins()
            .map_err(|_| PluginSystemError::RegistryUnavailable)?;

        let location = state.classpath.ensure(&mut *host, self.artifact)?;

        if self.config.patch_exclusion_list {
            ExclusionPatcher::from_config(self.config).apply(&mut *host, &location);
        }

        for descriptor in &self.config.services {
            self.bootstrap_service(host, state, descriptor, &location)?;
        }
        Ok(())
    }

    fn check_compatibility(&self, host: &dyn Host) -> Result<(), PluginSystemError> {
        let gate = CompatibilityGate::from_minimum(&self.config.minimum_api_version)?;
        let reported = host.api_version();
        if let Err(e) = gate.check(reported.as_deref()) {
            log::error!("-------------------------[ ERROR ]-------------------------");
            log::error!(
                "{} v{} is not compatible with host API v{}",
                self.config.bridge_name,
                constants::BRIDGE_VERSION,
                reported.as_deref().unwrap_or("unknown")
            );
            log::error!("Host API v{} or later is required", gate.minimum());
            log::error!("-------------------------[ ERROR ]-------------------------");
            return Err(e);
        }
        Ok(())
    }

    fn bootstrap_service(
        &self,
        host: &mut dyn Host,
        state: &mut BootstrapState,
        descriptor: &ServiceDescriptor,
        location: &Path,
    ) -> Result<(), PluginSystemError> {
        let resolved = self.factory.resolve(descriptor).inspect_err(|e| {
            log::error!("Encountered an error while registering {}: {}", descriptor.qualified_name, e);
        })?;
        let service_type = resolved.service_type();

        match resolved {
            ResolvedService::LaunchPlugin(plugin) => {
                let registered = host
                    .launch_plugins()
                    .map_err(|_| PluginSystemError::RegistryUnavailable)?;
                let existing = registered
                    .iter()
                    .map(|(key, plugin)| (key.as_str(), plugin.service_type()));
                if self.guard.check(&service_type, existing).is_some() {
                    return Ok(());
                }

                let name = plugin.name().to_string();
                self.registrar
                    .register(host, plugin, self.config, location)
                    .inspect_err(|e| {
                        log::error!("Encountered an error while registering {}: {}", descriptor.qualified_name, e);
                    })?;
                log::debug!("Registered {} ({})", service_type.simple_name(), name);
            }
            ResolvedService::TransformationService(service) => {
                let existing = state
                    .services
                    .iter()
                    .map(|service| (service.name(), service.service_type()));
                if self.guard.check(&service_type, existing).is_some() {
                    return Ok(());
                }

                let name = service.name().to_string();
                state.services.push(service);
                log::debug!("Registered {} ({})", service_type.simple_name(), name);
            }
        }
        Ok(())
    }
}
