use crate::error::ProviderError;
use crate::key_info::KeyInfo;

/// Trait for credential sources (cloud IAM APIs, service account stores, etc.)
///
/// A source is constructed with the original credential pair and lives for
/// exactly one rotation attempt: `mint` at most once, then either `commit`
/// or `revert` before the run ends.
#[async_trait::async_trait]
pub trait CredentialSource: Send + Sync {
    /// The credential pair the source was constructed with. Pure; returns
    /// the same value for the whole lifetime of the source.
    fn original_key_infos(&self) -> Vec<KeyInfo>;

    /// Create a new credential at the provider, record it as pending and
    /// return its key infos.
    ///
    /// At most once per instance; a second call is a programming error and
    /// panics.
    async fn mint(&mut self) -> Result<Vec<KeyInfo>, ProviderError>;

    /// Delete the pending credential, retaining the original. Succeeds as a
    /// no-op when nothing is pending.
    async fn revert(&mut self) -> Result<(), ProviderError>;

    /// Delete the original credential, retaining the pending one.
    ///
    /// Panics if `mint` has not succeeded on this instance.
    async fn commit(&mut self) -> Result<(), ProviderError>;

    /// Get the source type name for display purposes
    fn source_type(&self) -> &'static str;
}
