//! Credential consumer implementations
//!
//! This module provides the sink abstraction and implementations for the
//! destinations a rotated credential is fanned out to:
//! - Secret stores (HashiCorp Vault KV)
//! - Local environment files consumed by shells or CI runners

mod env_file;
mod target;
mod vault;

pub use env_file::EnvFileTarget;
pub use target::TargetSink;
pub use vault::VaultTarget;

/// Type alias for target trait object
pub type TargetInstance = Box<dyn TargetSink>;
