//! Configuration types and presets

use serde::{Deserialize, Serialize};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directives (e.g., "info", "debug,aws_smithy_runtime=warn")
    pub level: String,

    /// Output format
    pub format: Format,

    /// Output destination
    pub writer: Writer,

    /// Display configuration
    pub display: DisplayConfig,

    /// Fields attached to every event through a root span
    pub fields: Fields,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable, multi-line
    Pretty,
    /// Single line per event
    Compact,
    /// One JSON object per event
    Json,
}

impl Format {
    /// Parse a format name, case-insensitive
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// Output destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Writer {
    /// Standard error
    #[default]
    Stderr,
    /// Standard output
    Stdout,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show timestamps
    pub time: bool,
    /// Show source location (file:line)
    pub source: bool,
    /// Show target module
    pub target: bool,
    /// Show thread ids
    pub thread_ids: bool,
    /// Use ANSI colors
    pub colors: bool,
    /// Flatten event fields into the top-level JSON object
    pub flatten: bool,
}

/// Global fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fields {
    /// Service name
    pub service: Option<String>,
    /// Environment (dev/staging/prod)
    pub env: Option<String>,
    /// Version
    pub version: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Compact,
            writer: Writer::Stderr,
            display: DisplayConfig::default(),
            fields: Fields::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time: true,
            source: cfg!(debug_assertions),
            target: true,
            thread_ids: false,
            colors: cfg!(feature = "ansi") && std::io::IsTerminal::is_terminal(&std::io::stderr()),
            flatten: true,
        }
    }
}

impl LogConfig {
    /// Configuration from `KEYTURN_LOG*` / `RUST_LOG` environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Configuration from an arbitrary variable lookup
    ///
    /// `KEYTURN_LOG` wins over `RUST_LOG`. Unknown `KEYTURN_LOG_FORMAT` values
    /// fall back to compact.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = lookup("KEYTURN_LOG").or_else(|| lookup("RUST_LOG")) {
            config.level = level;
        }

        if let Some(format) = lookup("KEYTURN_LOG_FORMAT") {
            config.format = Format::parse(&format).unwrap_or(Format::Compact);
        }

        config.display.apply_env(&lookup);
        config.fields = Fields::from_lookup(&lookup);

        config
    }

    /// Development configuration (pretty, debug level)
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: Format::Pretty,
            display: DisplayConfig {
                colors: true,
                source: true,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }

    /// Production configuration (JSON, info level)
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Json,
            display: DisplayConfig {
                colors: false,
                source: false,
                flatten: true,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }

    /// Test configuration (trace level, no colors, no timestamps)
    #[must_use]
    pub fn test() -> Self {
        Self {
            level: "trace".to_string(),
            format: Format::Compact,
            display: DisplayConfig {
                colors: false,
                time: false,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }
}

fn flag(value: &str) -> bool {
    value != "0" && !value.eq_ignore_ascii_case("false")
}

impl DisplayConfig {
    fn apply_env(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("KEYTURN_LOG_TIME") {
            self.time = flag(&v);
        }
        if let Some(v) = lookup("KEYTURN_LOG_SOURCE") {
            self.source = flag(&v);
        }
        if let Some(v) = lookup("KEYTURN_LOG_COLORS") {
            self.colors = flag(&v);
        }
    }
}

impl Fields {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        Self {
            service: lookup("KEYTURN_SERVICE"),
            env: lookup("KEYTURN_ENV"),
            version: lookup("KEYTURN_VERSION"),
        }
    }

    /// Check if fields are empty
    pub fn is_empty(&self) -> bool {
        self.service.is_none() && self.env.is_none() && self.version.is_none()
    }
}
