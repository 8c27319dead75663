//! Keyturn Rotation
//!
//! Rotates access keys for a cloud identity across three systems: the
//! credential authority that issues keys, a versioned secret store that
//! records which key is current, and a notifier that tells humans.
//!
//! # Features
//!
//! - **Three-step lifecycle** - create, deactivate, delete; each a separate invocation
//! - **Consistency check** - delete refuses when the store and the authority disagree
//! - **Injectable capabilities** - authority, store and notifier are traits
//! - **Partial-failure reports** - every run records how far it got
//! - **AWS backends** - IAM, Secrets Manager and SNS behind the `aws` feature
//!
//! # Example
//!
//! ```
//! use keyturn_rotation::Identity;
//!
//! let identity = Identity::new("svc-app").unwrap();
//! assert_eq!(identity.as_str(), "svc-app");
//! assert!(Identity::new("").is_err());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Authority, secret store and notifier traits
pub mod capability;
pub mod config;
/// Identifiers, key types and outcomes
pub mod core;
pub mod dispatch;
pub mod providers;
pub mod rotation;

/// Commonly used types and traits
pub mod prelude {
    pub use crate::capability::{CredentialAuthority, Notifier, SecretStore};
    pub use crate::config::RotationConfig;
    pub use crate::core::{AccessKeyId, Identity, Operation, RotationOutcome};
    pub use crate::dispatch::{Dispatcher, RotationRequest, RotationResponse};
    pub use crate::rotation::{RotationEngine, RotationError, RotationReport};
}

pub use capability::{
    AuthorityError, CredentialAuthority, Notifier, NotifyError, SecretStore, StoreError,
};
pub use config::{ConfigError, DEFAULT_GRACE_PERIOD_DAYS, RotationConfig, SecretNaming};
pub use crate::core::{
    AccessKeyId, Identity, IssuedCredential, KeyStatus, KeySummary, Operation, RecordError,
    RotationOutcome, SecretRecord, ValidationError, VersionStage,
};
pub use dispatch::{Action, Dispatcher, RotationRequest, RotationResponse};
pub use rotation::{
    IdentityLease, IdentityLock, LocalIdentityLock, NoopLock, Progress, RotationEngine,
    RotationError, RotationId, RotationReport, RotationResult,
};
