//! Error types for logger setup

use thiserror::Error;

/// Errors raised while installing the global subscriber
#[derive(Debug, Error)]
pub enum LogError {
    /// Filter directives could not be parsed
    #[error("Invalid filter '{filter}': {reason}")]
    Filter {
        /// Directives as given
        filter: String,
        /// Parser message
        reason: String,
    },

    /// A global subscriber is already installed
    #[error("Logger initialization failed: {0}")]
    Init(String),
}

/// Result type for logger operations
pub type LogResult<T> = Result<T, LogError>;
