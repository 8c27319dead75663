//! Rotation configuration
//!
//! Environment-specific settings only. Nothing here changes what a rotation
//! step does; it changes where calls go and what the notifications say.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::Identity;

/// Grace period announced in notifications
pub const DEFAULT_GRACE_PERIOD_DAYS: u32 = 14;

const MAX_SECRET_PREFIX_LENGTH: usize = 512;

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds an unusable value
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A field required by the selected backends is missing
    #[error("Missing required configuration: {field}")]
    Missing {
        /// Missing field
        field: &'static str,
    },
}

/// Secret id for each identity: `<prefix><identity>`
///
/// Shared by the secret store and the notification texts so both name the
/// same secret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretNaming {
    prefix: String,
}

impl SecretNaming {
    /// Naming with the given prefix; empty means the bare identity
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Secret id for `identity`
    pub fn secret_id(&self, identity: &Identity) -> String {
        format!("{}{}", self.prefix, identity)
    }
}

/// Settings shared by the engine and the backends
///
/// # Example
///
/// ```
/// use keyturn_rotation::RotationConfig;
///
/// let config = RotationConfig {
///     region: Some("eu-west-1".into()),
///     notification_topic_arn: Some("arn:aws:sns:eu-west-1:123456789012:key-rotation".into()),
///     ..Default::default()
/// };
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.grace_period_days, 14);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Region for all three services; the SDK default chain applies when unset
    pub region: Option<String>,

    /// Endpoint override for every service (LocalStack and friends)
    pub endpoint_url: Option<String>,

    /// Topic that receives rotation notifications
    pub notification_topic_arn: Option<String>,

    /// Prefix joined to the identity to form the store's secret id
    pub secret_prefix: String,

    /// Days announced between issuing a key and retiring the old one
    ///
    /// Text only: no timer in this crate enforces it.
    pub grace_period_days: u32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint_url: None,
            notification_topic_arn: None,
            secret_prefix: String::new(),
            grace_period_days: DEFAULT_GRACE_PERIOD_DAYS,
        }
    }
}

impl RotationConfig {
    /// Validate field values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=365).contains(&self.grace_period_days) {
            return Err(ConfigError::InvalidValue {
                field: "grace_period_days",
                reason: format!("must be between 1 and 365, got {}", self.grace_period_days),
            });
        }

        if self.secret_prefix.len() > MAX_SECRET_PREFIX_LENGTH {
            return Err(ConfigError::InvalidValue {
                field: "secret_prefix",
                reason: format!(
                    "exceeds {MAX_SECRET_PREFIX_LENGTH} character limit ({})",
                    self.secret_prefix.len()
                ),
            });
        }

        let invalid_chars = ['<', '>', '{', '}', '[', ']', '|', '\\', '^', '`', ' '];
        if self.secret_prefix.chars().any(|c| invalid_chars.contains(&c)) {
            return Err(ConfigError::InvalidValue {
                field: "secret_prefix",
                reason: "contains characters not allowed in secret names".into(),
            });
        }

        if let Some(region) = &self.region
            && region.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue {
                field: "region",
                reason: "must not be blank".into(),
            });
        }

        if let Some(arn) = &self.notification_topic_arn
            && !arn.starts_with("arn:")
        {
            return Err(ConfigError::InvalidValue {
                field: "notification_topic_arn",
                reason: format!("'{arn}' is not an ARN"),
            });
        }

        Ok(())
    }

    /// Topic ARN, required by the SNS notifier
    pub fn require_topic(&self) -> Result<&str, ConfigError> {
        self.notification_topic_arn
            .as_deref()
            .ok_or(ConfigError::Missing {
                field: "notification_topic_arn",
            })
    }

    /// How identities map to secret ids
    pub fn secret_naming(&self) -> SecretNaming {
        SecretNaming::new(self.secret_prefix.clone())
    }

    /// Store-side secret id for an identity
    pub fn secret_id(&self, identity: &Identity) -> String {
        self.secret_naming().secret_id(identity)
    }

    /// Region as shown to humans in notifications
    pub fn region_label(&self) -> &str {
        self.region.as_deref().unwrap_or("the default region")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_validate() {
        let config = RotationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grace_period_days, DEFAULT_GRACE_PERIOD_DAYS);
    }

    #[rstest]
    #[case::zero_grace(RotationConfig { grace_period_days: 0, ..Default::default() }, "grace_period_days")]
    #[case::bad_prefix(RotationConfig { secret_prefix: "keys/<x>".into(), ..Default::default() }, "secret_prefix")]
    #[case::blank_region(RotationConfig { region: Some("  ".into()), ..Default::default() }, "region")]
    #[case::not_an_arn(RotationConfig { notification_topic_arn: Some("key-rotation".into()), ..Default::default() }, "notification_topic_arn")]
    fn rejects_invalid(#[case] config: RotationConfig, #[case] expected_field: &str) {
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected invalid {expected_field}, got {other:?}"),
        }
    }

    #[test]
    fn secret_id_joins_prefix() {
        let identity = Identity::new("svc-app").unwrap();
        let config = RotationConfig {
            secret_prefix: "rotation/".into(),
            ..Default::default()
        };
        assert_eq!(config.secret_id(&identity), "rotation/svc-app");
        assert_eq!(RotationConfig::default().secret_id(&identity), "svc-app");
    }

    #[test]
    fn topic_is_required_on_demand() {
        assert_eq!(
            RotationConfig::default().require_topic(),
            Err(ConfigError::Missing {
                field: "notification_topic_arn"
            })
        );
    }

    #[test]
    fn deserializes_partial_document() {
        let config: RotationConfig =
            serde_json::from_str(r#"{"region":"us-east-1","grace_period_days":7}"#).unwrap();
        assert_eq!(config.region.as_deref(), Some("us-east-1"));
        assert_eq!(config.grace_period_days, 7);
        assert!(config.secret_prefix.is_empty());
    }
}
