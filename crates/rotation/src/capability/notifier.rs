//! Broadcast notification capability

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a [`Notifier`]
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport or service failure
    #[error("Notification publish failed: {message}")]
    Service {
        /// Underlying error, rendered
        message: String,
    },
}

/// Fire-and-forget broadcast to an audience fixed by configuration
///
/// A successful return means the channel accepted the message, not that
/// anyone read it.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish one message
    async fn publish(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}
