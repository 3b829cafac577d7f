//! Access Key Rotation Library
//!
//! A library for rotating a cloud access key pair across downstream
//! consumers, with automatic rollback when any consumer rejects the new
//! credential.

pub mod config;
pub mod error;
pub mod key_info;
pub mod rotation;
pub mod sources;
pub mod targets;

pub use config::Config;
pub use error::{ConfigurationError, InconsistentState, ProviderError, TargetError, TargetFailure};
pub use key_info::KeyInfo;
pub use rotation::{run, RollbackReason, RunOutcome};
pub use sources::{AwsIamSource, CredentialSource};
pub use targets::{EnvFileTarget, TargetSink, VaultTarget};
