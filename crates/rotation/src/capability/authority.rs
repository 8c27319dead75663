//! Identity / credential authority capability
//!
//! The authority issues and revokes access keys. It is the source of truth for
//! whether a key exists and whether it is active; the secret store only
//! records which key *should* be current or previous.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::{AccessKeyId, Identity, IssuedCredential, KeyStatus, KeySummary};

/// Errors raised by a [`CredentialAuthority`]
#[derive(Debug, Error)]
pub enum AuthorityError {
    /// The identity is unknown to the authority
    #[error("Identity '{identity}' does not exist at the authority")]
    NoSuchIdentity {
        /// Identity that was addressed
        identity: String,
    },

    /// The key is unknown to the authority
    #[error("Access key '{key_id}' does not exist for '{identity}'")]
    NoSuchKey {
        /// Identity that was addressed
        identity: String,
        /// Key that was addressed
        key_id: String,
    },

    /// The identity already holds the maximum number of keys
    #[error("Access key limit reached for '{identity}'")]
    LimitExceeded {
        /// Identity that was addressed
        identity: String,
    },

    /// The authority answered, but not in a shape we can use
    #[error("Unexpected authority response to {operation}: {reason}")]
    UnexpectedResponse {
        /// Call that produced the response
        operation: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Transport or service failure
    #[error("Authority call {operation} failed: {message}")]
    Service {
        /// Call that failed
        operation: &'static str,
        /// Underlying error, rendered
        message: String,
    },
}

/// Issues, deactivates, deletes and lists access keys for an identity
///
/// Implementations are thin pass-throughs. Setting a key to the status it
/// already has must succeed.
#[async_trait]
pub trait CredentialAuthority: Send + Sync {
    /// Issue a new active key pair for `identity`
    async fn issue(&self, identity: &Identity) -> Result<IssuedCredential, AuthorityError>;

    /// Set the status of an existing key
    async fn set_status(
        &self,
        key_id: &AccessKeyId,
        identity: &Identity,
        status: KeyStatus,
    ) -> Result<(), AuthorityError>;

    /// Remove a key permanently
    async fn delete(&self, key_id: &AccessKeyId, identity: &Identity)
    -> Result<(), AuthorityError>;

    /// List every key the authority holds for `identity`, in authority order
    async fn list(&self, identity: &Identity) -> Result<Vec<KeySummary>, AuthorityError>;
}
