//! Rotation-specific error types
//!
//! Every capability failure is folded into [`RotationError`] at the operation
//! boundary. [`RotationError::outcome`] is the single place that decides the
//! coarse status a caller sees.

use thiserror::Error;

use crate::capability::{AuthorityError, NotifyError, StoreError};
use crate::core::{AccessKeyId, Identity, RecordError, RotationOutcome, VersionStage};

/// Errors that can occur during a rotation step
#[derive(Debug, Error)]
pub enum RotationError {
    /// Authority call failed
    #[error("Authority error: {0}")]
    Authority(#[from] AuthorityError),

    /// Secret store call failed
    #[error("Secret store error: {0}")]
    Store(#[from] StoreError),

    /// Notification could not be published
    #[error("Notification failed for {key_id}: {source}")]
    Notify {
        /// Key the notification was about
        key_id: AccessKeyId,
        /// Underlying notifier error
        #[source]
        source: NotifyError,
    },

    /// Issued credential could not be serialized
    #[error("Failed to seal issued credential: {0}")]
    Seal(#[source] RecordError),

    /// Stored record could not be read back as a key record
    #[error("Malformed {stage} secret record: {source}")]
    MalformedRecord {
        /// Stage that was read
        stage: VersionStage,
        /// Decoding failure
        #[source]
        source: RecordError,
    },

    /// The store's previous key is not the key the authority holds inactive
    #[error(
        "Secret store previous key {expected} does not match inactive authority key {found}"
    )]
    ConsistencyViolation {
        /// Key id recorded as previous in the store
        expected: AccessKeyId,
        /// Inactive key id reported by the authority
        found: AccessKeyId,
    },

    /// Another rotation holds the identity
    #[error("Rotation already in progress for {identity}")]
    ConcurrentRotation {
        /// Identity that is locked
        identity: Identity,
    },
}

impl RotationError {
    /// Coarse outcome for this error
    pub fn outcome(&self) -> RotationOutcome {
        match self {
            RotationError::ConsistencyViolation { .. } => RotationOutcome::Inconsistent,
            _ => RotationOutcome::Failed,
        }
    }

    /// Short classification used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            RotationError::Authority(_) => "authority",
            RotationError::Store(_) => "store",
            RotationError::Notify { .. } => "notify",
            RotationError::Seal(_) | RotationError::MalformedRecord { .. } => "record",
            RotationError::ConsistencyViolation { .. } => "consistency",
            RotationError::ConcurrentRotation { .. } => "concurrency",
        }
    }
}

/// Result type for rotation steps
pub type RotationResult<T> = Result<T, RotationError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: &str) -> AccessKeyId {
        AccessKeyId::new(id).unwrap()
    }

    #[test]
    fn only_consistency_violation_is_inconsistent() {
        let mismatch = RotationError::ConsistencyViolation {
            expected: key("AKIA0"),
            found: key("AKIA9"),
        };
        assert_eq!(mismatch.outcome(), RotationOutcome::Inconsistent);
        assert_eq!(mismatch.outcome().status_code(), 400);

        let missing = RotationError::Store(StoreError::NotFound {
            secret_id: "svc-app".into(),
            stage: VersionStage::Previous,
        });
        assert_eq!(missing.outcome(), RotationOutcome::Failed);

        let notify = RotationError::Notify {
            key_id: key("AKIA1"),
            source: NotifyError::Service {
                message: "throttled".into(),
            },
        };
        assert_eq!(notify.outcome().status_code(), 500);
        assert_eq!(notify.kind(), "notify");
    }

    #[test]
    fn messages_name_both_keys() {
        let err = RotationError::ConsistencyViolation {
            expected: key("AKIA0"),
            found: key("AKIA9"),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("AKIA0"));
        assert!(rendered.contains("AKIA9"));
    }
}
