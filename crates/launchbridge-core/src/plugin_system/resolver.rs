use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::kernel::constants;
use crate::plugin_system::adapter::BridgeLaunchPlugin;
use crate::plugin_system::error::{PluginSystemError, ResolutionFailure};
use crate::plugin_system::traits::{LaunchPlugin, ServiceKind, ServiceType, TransformationService};
use crate::utils::panic_message;

/// Result of a service constructor.
pub type ConstructionResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

type LaunchPluginConstructor = Box<dyn Fn() -> ConstructionResult<Arc<dyn LaunchPlugin>>>;
type TransformationServiceConstructor = Box<dyn Fn() -> ConstructionResult<Box<dyn TransformationService>>>;

/// Names a service implementation the bootstrap has to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub qualified_name: String,
    pub kind: ServiceKind,
}

impl ServiceDescriptor {
    pub fn launch_plugin(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            kind: ServiceKind::LaunchPlugin,
        }
    }

    pub fn transformation_service(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            kind: ServiceKind::TransformationService,
        }
    }

    /// The descriptors the bridge resolves when nothing else is configured: the
    /// bridged target's launch plugin and transformation service, then the
    /// bridge's own adapter launch plugin.
    pub fn defaults() -> Vec<ServiceDescriptor> {
        vec![
            Self::launch_plugin(constants::TARGET_LAUNCH_PLUGIN),
            Self::transformation_service(constants::TARGET_TRANSFORMATION_SERVICE),
            Self::launch_plugin(constants::ADAPTER_LAUNCH_PLUGIN),
        ]
    }
}

impl fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.qualified_name, self.kind)
    }
}

/// A freshly constructed service, not yet registered anywhere.
pub enum ResolvedService {
    LaunchPlugin(Arc<dyn LaunchPlugin>),
    TransformationService(Box<dyn TransformationService>),
}

impl ResolvedService {
    pub fn name(&self) -> &str {
        match self {
            ResolvedService::LaunchPlugin(plugin) => plugin.name(),
            ResolvedService::TransformationService(service) => service.name(),
        }
    }

    pub fn kind(&self) -> ServiceKind {
        match self {
            ResolvedService::LaunchPlugin(_) => ServiceKind::LaunchPlugin,
            ResolvedService::TransformationService(_) => ServiceKind::TransformationService,
        }
    }

    pub fn service_type(&self) -> ServiceType {
        match self {
            ResolvedService::LaunchPlugin(plugin) => plugin.service_type(),
            ResolvedService::TransformationService(service) => service.service_type(),
        }
    }
}

impl fmt::Debug for ResolvedService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedService")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("type", &self.service_type().name())
            .finish()
    }
}

enum Constructor {
    LaunchPlugin(LaunchPluginConstructor),
    TransformationService(TransformationServiceConstructor),
}

impl Constructor {
    fn kind(&self) -> ServiceKind {
        match self {
            Constructor::LaunchPlugin(_) => ServiceKind::LaunchPlugin,
            Constructor::TransformationService(_) => ServiceKind::TransformationService,
        }
    }
}

/// Table from qualified service names to constructors.
///
/// Stands in for loading a type by name: every service the bridge can resolve
/// has to be registered here up front.
#[derive(Default)]
pub struct ServiceFactory {
    constructors: HashMap<String, Constructor>,
}

impl ServiceFactory {
    /// Create an empty factory table
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Factory table holding the bridge's own adapter launch plugin.
    pub fn with_defaults() -> Self {
        let mut factory = Self::new();
        factory.register_launch_plugin(constants::ADAPTER_LAUNCH_PLUGIN, || {
            Ok(Arc::new(BridgeLaunchPlugin::new()) as Arc<dyn LaunchPlugin>)
        });
        factory
    }

    /// Register a launch plugin constructor. A later registration under the same
    /// name replaces the earlier one.
    pub fn register_launch_plugin<F>(&mut self, qualified_name: &str, constructor: F)
    where
        F: Fn() -> ConstructionResult<Arc<dyn LaunchPlugin>> + 'static,
    {
        self.insert(qualified_name, Constructor::LaunchPlugin(Box::new(constructor)));
    }

    /// Register a transformation service constructor. A later registration under
    /// the same name replaces the earlier one.
    pub fn register_transformation_service<F>(&mut self, qualified_name: &str, constructor: F)
    where
        F: Fn() -> ConstructionResult<Box<dyn TransformationService>> + 'static,
    {
        self.insert(qualified_name, Constructor::TransformationService(Box::new(constructor)));
    }

    fn insert(&mut self, qualified_name: &str, constructor: Constructor) {
        if self.constructors.insert(qualified_name.to_string(), constructor).is_some() {
            log::debug!("Replaced constructor for {}", qualified_name);
        }
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.constructors.contains_key(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Construct the service `descriptor` names.
    ///
    /// Fails when nothing is registered under the name, when the registered
    /// constructor produces the other kind of service, and when the constructor
    /// returns an error or panics.
    pub fn resolve(&self, descriptor: &ServiceDescriptor) -> Result<ResolvedService, PluginSystemError> {
        let name = descriptor.qualified_name.as_str();
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| PluginSystemError::resolution(name, ResolutionFailure::NotFound))?;

        if constructor.kind() != descriptor.kind {
            return Err(PluginSystemError::resolution(
                name,
                ResolutionFailure::KindMismatch {
                    requested: descriptor.kind,
                    actual: constructor.kind(),
                },
            ));
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match constructor {
            Constructor::LaunchPlugin(construct) => construct().map(ResolvedService::LaunchPlugin),
            Constructor::TransformationService(construct) => {
                construct().map(ResolvedService::TransformationService)
            }
        }));

        match outcome {
            Ok(Ok(service)) => Ok(service),
            Ok(Err(e)) => Err(PluginSystemError::resolution(
                name,
                ResolutionFailure::Construction(e.to_string()),
            )),
            Err(payload) => Err(PluginSystemError::resolution(
                name,
                ResolutionFailure::Panicked(panic_message(payload.as_ref())),
            )),
        }
    }
}

impl fmt::Debug for ServiceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.constructors.keys().collect();
        names.sort();
        f.debug_struct("ServiceFactory").field("constructors", &names).finish()
    }
}
