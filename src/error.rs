//! Error taxonomy for rotation runs.
//!
//! Adapters produce `ProviderError` / `TargetError`; the orchestrator wraps
//! target errors into per-target `TargetFailure`s and reserves
//! `InconsistentState` for the one case it cannot self-heal.

use std::fmt;

use thiserror::Error;

/// A remote call to the credential provider failed (mint, revert or commit).
#[derive(Debug, Error)]
#[error("provider call '{op}' failed: {reason:#}")]
pub struct ProviderError {
    op: &'static str,
    reason: anyhow::Error,
}

impl ProviderError {
    pub fn new(op: &'static str, reason: impl Into<anyhow::Error>) -> Self {
        Self {
            op,
            reason: reason.into(),
        }
    }

    /// The provider operation that failed, e.g. `"create access key"`.
    pub fn op(&self) -> &'static str {
        self.op
    }
}

/// A target's apply or revert call failed.
#[derive(Debug, Error)]
#[error("{reason:#}")]
pub struct TargetError {
    reason: anyhow::Error,
}

impl TargetError {
    pub fn new(reason: impl Into<anyhow::Error>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn msg(msg: impl fmt::Display) -> Self {
        Self {
            reason: anyhow::anyhow!("{msg}"),
        }
    }
}

/// A `TargetError` paired with the name of the target it came from.
#[derive(Debug, Error)]
#[error("target '{target}': {error}")]
pub struct TargetFailure {
    pub target: String,
    pub error: TargetError,
}

/// Caller misuse detected at or before run start. Handled safely
/// (auto-rollback) rather than left half-applied.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no targets configured; refusing to leave a new credential with no consumers")]
    NoTargets,

    #[error("duplicate key name '{0}' in credential set")]
    DuplicateKeyName(String),
}

/// A rollback-phase call (or the final commit) failed, so the provider and
/// the targets may no longer agree on which credential is live. The core has
/// no further compensating action; an operator has to reconcile by hand.
#[derive(Debug)]
pub struct InconsistentState {
    /// Targets whose `revert_to` failed; their live credential is unknown.
    pub targets: Vec<TargetFailure>,
    /// Set when `source.revert()` or `source.commit()` failed; the provider
    /// may still hold a credential that should have been retired.
    pub source: Option<ProviderError>,
}

impl fmt::Display for InconsistentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rotation left the system in an inconsistent state; manual intervention required"
        )?;
        for failure in &self.targets {
            write!(f, "; {}", failure)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; source: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for InconsistentState {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inconsistent_state_names_every_divergent_party() {
        let state = InconsistentState {
            targets: vec![TargetFailure {
                target: "vault:secret/ci".to_string(),
                error: TargetError::msg("connection refused"),
            }],
            source: Some(ProviderError::new(
                "delete access key",
                anyhow::anyhow!("throttled"),
            )),
        };

        let rendered = state.to_string();
        assert!(rendered.contains("manual intervention required"));
        assert!(rendered.contains("vault:secret/ci"));
        assert!(rendered.contains("connection refused"));
        assert!(rendered.contains("delete access key"));
    }

    #[test]
    fn test_target_failure_display() {
        let failure = TargetFailure {
            target: "env-file".to_string(),
            error: TargetError::msg("permission denied"),
        };
        assert_eq!(
            failure.to_string(),
            "target 'env-file': permission denied"
        );
    }
}
