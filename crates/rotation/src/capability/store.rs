//! Versioned secret store capability

use async_trait::async_trait;
use thiserror::Error;

use crate::core::{Identity, SecretRecord, VersionStage};

/// Errors raised by a [`SecretStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// No generation carries the requested stage
    #[error("Secret '{secret_id}' has no {stage} version")]
    NotFound {
        /// Store-side secret id
        secret_id: String,
        /// Stage that was requested
        stage: VersionStage,
    },

    /// The stored value is not a string secret
    #[error("Secret '{secret_id}' holds no string value")]
    NotAString {
        /// Store-side secret id
        secret_id: String,
    },

    /// Transport or service failure
    #[error("Secret store call {operation} failed for '{secret_id}': {message}")]
    Service {
        /// Call that failed
        operation: &'static str,
        /// Store-side secret id
        secret_id: String,
        /// Underlying error, rendered
        message: String,
    },
}

impl StoreError {
    /// Whether the error is the store reporting an absent stage
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Key/value store that keeps at least two generations per identity
///
/// Writing is the only mutation. Each write becomes `current` and demotes the
/// old `current` to `previous`; the engine never moves stage labels itself.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Write a new generation for `identity`
    async fn write_current(
        &self,
        identity: &Identity,
        record: &SecretRecord,
    ) -> Result<(), StoreError>;

    /// Read the generation carrying `stage`
    ///
    /// Fails with [`StoreError::NotFound`] when no generation carries it.
    async fn read(
        &self,
        identity: &Identity,
        stage: VersionStage,
    ) -> Result<SecretRecord, StoreError>;
}
