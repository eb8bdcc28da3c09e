//! # Launchbridge Core
//!
//! Bootstrap bridge that registers a secondary service framework into a host's
//! launch plugin registry during the host's single startup pass, so the host
//! sees it as a natively discovered plugin.
//!
//! The host registers one [`BridgeService`]. Its `on_load` hook checks the host
//! API version, extends the class path, excludes the bridge artifact from file
//! based discovery, then resolves and registers every configured service. All
//! later lifecycle calls are forwarded to the resolved transformation services.
pub mod config;
pub mod host;
pub mod kernel;
pub mod plugin_system;
pub mod utils;

pub use config::BridgeConfig;
pub use host::{Host, InMemoryHost};
pub use kernel::error::Error as KernelError;
pub use kernel::{BridgePhase, BridgeService};
pub use plugin_system::{LaunchPlugin, ServiceDescriptor, ServiceFactory, TransformationService};
