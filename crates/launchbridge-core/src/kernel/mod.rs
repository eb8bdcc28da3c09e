//! # Launchbridge Kernel
//!
//! The bootstrap pass and the facade the host calls.
//!
//! ## Components
//!
//! - **[`BridgeService`](bridge::BridgeService)**: the entry point registered
//!   with the host. Runs the bootstrap from `on_load`, then forwards every
//!   lifecycle call to the downstream transformation services.
//! - **[`Bootstrapper`](bootstrap::Bootstrapper)**: one pass of compatibility
//!   gate, registry check, class path extension, exclusion patch and service
//!   registration.
//! - **[`BootstrapState`](bootstrap::BootstrapState)**: phase, downstream
//!   services and class path state, created once per process.
//! - **Constants** and the kernel [`Error`](error::Error) / `Result` types.
pub mod bootstrap;
pub mod bridge;
pub mod constants;
pub mod error;

pub use bootstrap::{BootstrapState, Bootstrapper, BridgePhase};
pub use bridge::BridgeService;
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
