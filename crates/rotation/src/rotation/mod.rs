//! Access-key rotation
//!
//! [`RotationEngine`] owns the cross-system consistency logic; everything else
//! in this module supports it.

mod engine;
pub mod error;
mod lock;
pub mod messages;
mod report;

pub use engine::RotationEngine;
pub use error::{RotationError, RotationResult};
pub use lock::{IdentityLease, IdentityLock, LocalIdentityLock, NoopLock};
pub use messages::{Message, MessageTemplates};
pub use report::{Progress, RotationId, RotationReport};
