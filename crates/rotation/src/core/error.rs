//! Error types for the rotation data model
//!
//! - [`ValidationError`]: rejected identity or key-id input
//! - [`RecordError`]: a secret-store payload that cannot be encoded or parsed

use thiserror::Error;

/// Input validation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Identity name failed validation
    #[error("Invalid identity '{name}': {reason}")]
    InvalidIdentity {
        /// Rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Access-key id failed validation
    #[error("Invalid access key id '{id}': {reason}")]
    InvalidAccessKeyId {
        /// Rejected id
        id: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Secret record encoding errors
///
/// Messages never include the payload itself.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Serializing an issued credential failed
    #[error("Failed to encode secret record: {0}")]
    Encode(#[source] serde_json::Error),

    /// Stored payload is not a key record
    ///
    /// Only the parse position is kept: the parser's own message can quote
    /// fragments of the payload.
    #[error("Stored secret is not a key record (parse error at line {line}, column {column})")]
    Decode {
        /// Line of the parse error
        line: usize,
        /// Column of the parse error
        column: usize,
    },

    /// Stored payload names an unusable key id
    #[error("Stored secret carries an invalid key id: {0}")]
    InvalidKeyId(#[source] ValidationError),
}
