//! Layered application configuration
//!
//! Rotation settings come from the `[rotation]` table of the TOML file and are
//! overridden by `KEYTURN_ROTATION_*` variables. Logging comes from the `[log]`
//! table when present, otherwise from the `KEYTURN_LOG*` variables.

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use keyturn_log::LogConfig;
use keyturn_rotation::RotationConfig;
use std::path::Path;

const ROTATION_ENV_PREFIX: &str = "KEYTURN_ROTATION_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub rotation: RotationConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Load and validate
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => Figment::new().merge(Toml::file_exact(path)),
            None => Figment::new(),
        };

        let rotation: RotationConfig = file
            .focus("rotation")
            .merge(Env::prefixed(ROTATION_ENV_PREFIX))
            .extract()?;
        rotation.validate()?;

        let log = if file.find_value("log").is_ok() {
            file.extract_inner("log")?
        } else {
            LogConfig::from_env()
        };

        Ok(Self { rotation, log })
    }
}
