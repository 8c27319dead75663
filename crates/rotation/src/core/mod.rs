//! Core types for access-key rotation
mod error;
mod id;
mod key;
mod outcome;

pub use error::{RecordError, ValidationError};
pub use id::{AccessKeyId, Identity};
pub use key::{IssuedCredential, KeyStatus, KeySummary, SecretRecord, VersionStage};
pub use outcome::{Operation, RotationOutcome};
