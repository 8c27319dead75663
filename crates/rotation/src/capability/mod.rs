//! External capabilities the rotation engine drives
//!
//! Each trait wraps exactly one external service. Nothing here touches more
//! than one of them, so cross-system consistency lives in the engine only.

mod authority;
mod notifier;
mod store;

pub use authority::{AuthorityError, CredentialAuthority};
pub use notifier::{Notifier, NotifyError};
pub use store::{SecretStore, StoreError};
