//! # Keyturn Log
//!
//! One-call logging setup for keyturn binaries.
//!
//! ## Quick Start
//!
//! ```no_run
//! use keyturn_log::prelude::*;
//!
//! fn main() -> LogResult<()> {
//!     let _guard = keyturn_log::auto_init()?;
//!
//!     info!(action = "create", "Rotation starting");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod builder;
mod config;
mod error;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{DisplayConfig, Fields, Format, LogConfig, Writer};
pub use error::{LogError, LogResult};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{LogResult, auto_init, debug, error, info, init, init_with, trace, warn};
}

pub use tracing::{debug, error, info, instrument, trace, warn};

/// Pick a configuration from the environment and install it
///
/// `KEYTURN_LOG` or `RUST_LOG` selects [`LogConfig::from_env`]; otherwise
/// debug builds get [`LogConfig::development`] and release builds
/// [`LogConfig::production`].
pub fn auto_init() -> LogResult<LoggerGuard> {
    init_with(auto_config(|key| std::env::var(key).ok()))
}

fn auto_config(lookup: impl Fn(&str) -> Option<String>) -> LogConfig {
    if lookup("KEYTURN_LOG").is_some() || lookup("RUST_LOG").is_some() {
        LogConfig::from_lookup(lookup)
    } else if cfg!(debug_assertions) {
        LogConfig::development()
    } else {
        LogConfig::production()
    }
}

/// Initialize with default configuration
pub fn init() -> LogResult<LoggerGuard> {
    init_with(LogConfig::default())
}

/// Initialize with custom configuration
pub fn init_with(config: LogConfig) -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}

/// Initialize for tests; a no-op when a subscriber is already installed
pub fn init_test() -> LoggerGuard {
    if tracing::dispatcher::has_been_set() {
        return LoggerGuard::noop();
    }
    init_with(LogConfig::test()).unwrap_or_else(|_| LoggerGuard::noop())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_config_prefers_environment() {
        let config = auto_config(|key| (key == "RUST_LOG").then(|| "warn".to_string()));
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn auto_config_without_environment_uses_build_profile() {
        let config = auto_config(|_| None);
        let expected = if cfg!(debug_assertions) {
            LogConfig::development()
        } else {
            LogConfig::production()
        };
        assert_eq!(config, expected);
    }

    #[test]
    fn init_test_is_repeatable() {
        let _first = init_test();
        let _second = init_test();
        info!("logged after repeated init");
    }
}
