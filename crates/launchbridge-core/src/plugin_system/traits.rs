use std::any::{Any, TypeId};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::host::{ArgumentBuilder, Environment, OptionValues};
use crate::kernel::error::Result;

/// Category a service belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Participates in low-level class inspection during the host's load phase.
    LaunchPlugin,
    /// Declares arguments, scans for extra resources and contributes transformers.
    TransformationService,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::LaunchPlugin => write!(f, "launch plugin"),
            ServiceKind::TransformationService => write!(f, "transformation service"),
        }
    }
}

/// Identity of a concrete service type.
///
/// `TypeId`s of one type compiled into two separately loaded artifacts differ,
/// so equivalence falls back to the fully qualified type name.
#[derive(Debug, Clone, Copy)]
pub struct ServiceType {
    id: TypeId,
    name: &'static str,
}

impl ServiceType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Build an identity from parts, for services whose type information comes
    /// from another loader context.
    pub fn from_parts(id: TypeId, name: &'static str) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Simple type name, without the module path.
    pub fn simple_name(&self) -> &'static str {
        let without_generics = self.name.split('<').next().unwrap_or(self.name);
        without_generics.rsplit("::").next().unwrap_or(without_generics)
    }

    pub fn is_equivalent(&self, other: &ServiceType) -> bool {
        self.id == other.id || self.name == other.name
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Launch plugin contract, as far as the bridge needs it.
pub trait LaunchPlugin: Any + Send + Sync {
    /// Name the plugin is registered under.
    fn name(&self) -> &str;

    /// Concrete type identity, used by the duplicate guard.
    fn service_type(&self) -> ServiceType {
        ServiceType::of::<Self>()
    }
}

impl fmt::Debug for dyn LaunchPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LaunchPlugin({} as {})", self.name(), self.service_type().simple_name())
    }
}

/// Opaque transformer contributed by a transformation service.
pub trait Transformer: Send + Sync {
    fn name(&self) -> &str;
}

impl fmt::Debug for dyn Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transformer({})", self.name())
    }
}

/// A resource found during the scan phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResource {
    pub name: String,
    pub path: PathBuf,
}

impl ScanResource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Transformation service lifecycle, called by the host in this order:
/// `on_load`, `arguments`, `argument_values`, `initialize`, `begin_scanning`,
/// `run_scan`, `transformers`.
///
/// The bridge's own entry point implements this trait too, which is what lets the
/// host treat it as a natively discovered service.
pub trait TransformationService: Any {
    fn name(&self) -> &str;

    /// Declare command line arguments.
    fn arguments(&mut self, _builder: &mut dyn ArgumentBuilder) {}

    /// Receive the parsed values of the declared arguments.
    fn argument_values(&mut self, _values: &dyn OptionValues) {}

    fn initialize(&mut self, environment: &mut dyn Environment);

    fn begin_scanning(&mut self, _environment: &mut dyn Environment) {}

    /// Resources this service wants added to the host's scan results.
    fn run_scan(&mut self, _environment: &mut dyn Environment) -> Vec<ScanResource> {
        Vec::new()
    }

    /// Load hook. An error tells the host its environment is incompatible.
    fn on_load(&mut self, environment: &mut dyn Environment, other_services: &BTreeSet<String>) -> Result<()>;

    fn transformers(&mut self) -> Vec<Arc<dyn Transformer>>;

    fn service_type(&self) -> ServiceType {
        ServiceType::of::<Self>()
    }
}
