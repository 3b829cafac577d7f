//! The rotation state machine: source → distribute → commit-or-rollback.
//!
//! One call to [`run`] is one rotation attempt. The invariant it maintains:
//! from the moment a new credential is minted, either the original or the new
//! credential is live at the provider and at every target that has finished
//! processing. The only escape from that invariant is [`InconsistentState`],
//! which is surfaced rather than swallowed.

use futures::future;
use tracing::{error, info, warn};

use crate::error::{ConfigurationError, InconsistentState, ProviderError, TargetFailure};
use crate::key_info::{self, KeyInfo};
use crate::sources::CredentialSource;
use crate::targets::TargetSink;

/// Terminal result of a rotation run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every target accepted the new credential and the old one was retired.
    Committed,
    /// The original credential was restored everywhere; the reason carries
    /// the triggering errors for diagnostics.
    RolledBack(RollbackReason),
    /// Minting failed before any external state changed; nothing to undo.
    Failed(ProviderError),
}

/// Why a run ended in rollback.
#[derive(Debug)]
pub enum RollbackReason {
    /// The run was misconfigured (empty target list); the freshly minted
    /// credential was retired without ever being distributed.
    Misconfigured(ConfigurationError),
    /// One or more targets rejected the new credential.
    TargetFailures(Vec<TargetFailure>),
}

/// Run one rotation: mint a new credential, fan it out to every target
/// concurrently, then commit or roll back.
///
/// The fan-out is a join, not a race: every target finishes `apply` before
/// the commit/rollback decision is made, so the rollback fan-out addresses
/// all of them consistently. `Err(InconsistentState)` is returned only when
/// a rollback-phase call (or the final commit) itself fails.
pub async fn run(
    source: &mut dyn CredentialSource,
    targets: &[Box<dyn TargetSink>],
) -> Result<RunOutcome, InconsistentState> {
    info!(
        "Starting rotation of {} credential across {} target(s)",
        source.source_type(),
        targets.len()
    );

    let new_key_infos = match source.mint().await {
        Ok(key_infos) => key_infos,
        Err(e) => {
            // Nothing was distributed and the original credential was never
            // touched, so there is nothing to roll back.
            error!("Failed to mint a new credential: {}", e);
            return Ok(RunOutcome::Failed(e));
        }
    };
    debug_assert!(
        key_info::validate_unique_names(&new_key_infos).is_ok(),
        "source produced duplicate key names"
    );
    info!("Minted new credential: {:?}", key_info::names(&new_key_infos));

    if targets.is_empty() {
        warn!("No targets configured; retiring the new credential again");
        return match source.revert().await {
            Ok(()) => Ok(RunOutcome::RolledBack(RollbackReason::Misconfigured(
                ConfigurationError::NoTargets,
            ))),
            Err(e) => Err(InconsistentState {
                targets: Vec::new(),
                source: Some(e),
            }),
        };
    }

    let apply_failures = apply_all(targets, &new_key_infos).await;

    if apply_failures.is_empty() {
        info!("All {} target(s) accepted the new credential", targets.len());
        return match source.commit().await {
            Ok(()) => {
                info!("Retired the original credential; rotation committed");
                Ok(RunOutcome::Committed)
            }
            // Every target already holds the new credential, but the old one
            // is still live at the provider and has to be retired by hand.
            Err(e) => Err(InconsistentState {
                targets: Vec::new(),
                source: Some(e),
            }),
        };
    }

    warn!(
        "{} of {} target(s) rejected the new credential; rolling back",
        apply_failures.len(),
        targets.len()
    );
    for failure in &apply_failures {
        warn!("{}", failure);
    }

    // Every target gets the original credential back, including those whose
    // apply succeeded.
    let original_key_infos = source.original_key_infos();
    let revert_failures = revert_all(targets, &original_key_infos).await;

    // Still attempt the source revert when some targets failed to restore,
    // so the inconsistency report covers everything at once.
    let source_error = source.revert().await.err();

    if revert_failures.is_empty() && source_error.is_none() {
        info!("Original credential restored everywhere; rotation rolled back");
        Ok(RunOutcome::RolledBack(RollbackReason::TargetFailures(
            apply_failures,
        )))
    } else {
        Err(InconsistentState {
            targets: revert_failures,
            source: source_error,
        })
    }
}

/// Fan `apply` out to every target and join, collecting per-target failures.
async fn apply_all(targets: &[Box<dyn TargetSink>], key_infos: &[KeyInfo]) -> Vec<TargetFailure> {
    let results = future::join_all(targets.iter().map(|t| t.apply(key_infos))).await;
    collect_failures(targets, results)
}

/// Fan `revert_to` out to every target and join.
async fn revert_all(targets: &[Box<dyn TargetSink>], key_infos: &[KeyInfo]) -> Vec<TargetFailure> {
    let results = future::join_all(targets.iter().map(|t| t.revert_to(key_infos))).await;
    collect_failures(targets, results)
}

fn collect_failures(
    targets: &[Box<dyn TargetSink>],
    results: Vec<Result<(), crate::error::TargetError>>,
) -> Vec<TargetFailure> {
    results
        .into_iter()
        .zip(targets)
        .filter_map(|(result, target)| {
            result.err().map(|error| TargetFailure {
                target: target.name(),
                error,
            })
        })
        .collect()
}
