//! Capability backends
//!
//! - [`memory`] - in-process stand-ins, always available
//! - `aws` - IAM, Secrets Manager and SNS (requires `aws` feature)

pub mod memory;

#[cfg(feature = "aws")]
pub mod aws;

pub use memory::{Call, Journal, MemoryAuthority, MemoryNotifier, MemorySecretStore, SentMessage};

#[cfg(feature = "aws")]
pub use aws::{AwsBackends, IamAuthority, SecretsManagerStore, SnsNotifier};
