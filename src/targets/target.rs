use crate::error::TargetError;
use crate::key_info::KeyInfo;

/// Trait for credential consumers (secret stores, CI variables, env files, etc.)
#[async_trait::async_trait]
pub trait TargetSink: Send + Sync {
    /// Deliver the given credential to the destination.
    async fn apply(&self, key_infos: &[KeyInfo]) -> Result<(), TargetError>;

    /// Restore the destination to the given (original) credential.
    ///
    /// Must be an absolute restoration, not a compensating delta: it is
    /// called on every target during rollback, including targets whose
    /// `apply` never ran because a sibling failed first.
    async fn revert_to(&self, key_infos: &[KeyInfo]) -> Result<(), TargetError>;

    /// Get the target type name for display purposes
    fn target_type(&self) -> &'static str;

    /// Identifier used in logs and inconsistency reports. Defaults to the
    /// target type; implementations with a natural address should override.
    fn name(&self) -> String {
        self.target_type().to_string()
    }
}
