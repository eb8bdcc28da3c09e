//! # Launchbridge Plugin System
//!
//! Building blocks of the bootstrap pass.
//!
//! - **[`traits`]**: the launch plugin and transformation service contracts and
//!   [`ServiceType`], the identity the duplicate guard compares.
//! - **[`version`]**: host API versions and the [`CompatibilityGate`].
//! - **[`loader`]**: the one-time class path extension.
//! - **[`resolver`]**: [`ServiceFactory`], the table from qualified names to
//!   constructors, and [`ServiceDescriptor`].
//! - **[`conflict`]**: [`DuplicateGuard`].
//! - **[`registrar`]**: registry insertion followed by best-effort
//!   [`PostRegistrationHook`]s.
//! - **[`exclusion`]**: [`ExclusionPatcher`], which keeps the bridge artifact out
//!   of the host's file based discovery.
//! - **[`locator`]**: the custom folder locator stored in host properties.
//! - **[`adapter`]**: the bridge's own launch plugin.
//! - **[`error`]**: [`PluginSystemError`].
pub mod adapter;
pub mod conflict;
pub mod error;
pub mod exclusion;
pub mod loader;
pub mod locator;
pub mod registrar;
pub mod resolver;
pub mod traits;
pub mod version;

pub use adapter::BridgeLaunchPlugin;
pub use conflict::{DuplicateGuard, DuplicateRegistration};
pub use error::{PluginSystemError, ResolutionFailure};
pub use exclusion::{ExclusionOutcome, ExclusionPatcher};
pub use loader::ClasspathExtension;
pub use locator::CustomFolderLocator;
pub use registrar::{PluginRegistrar, PostRegistrationHook, RegistrationContext};
pub use resolver::{ConstructionResult, ResolvedService, ServiceDescriptor, ServiceFactory};
pub use traits::{LaunchPlugin, ScanResource, ServiceKind, ServiceType, TransformationService, Transformer};
pub use version::{ApiVersion, CompatibilityGate, VersionRange};

#[cfg(test)]
mod tests;
