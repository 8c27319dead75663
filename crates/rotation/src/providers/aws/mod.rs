//! AWS backends
//!
//! IAM issues and revokes keys, Secrets Manager versions them
//! (`AWSCURRENT` / `AWSPREVIOUS`), SNS carries the notifications.
//!
//! # Configuration
//!
//! ```rust,ignore
//! use keyturn_rotation::RotationConfig;
//! use keyturn_rotation::providers::AwsBackends;
//!
//! let config = RotationConfig {
//!     region: Some("us-east-1".into()),
//!     notification_topic_arn: Some("arn:aws:sns:us-east-1:123456789012:key-rotation".into()),
//!     ..Default::default()
//! };
//!
//! let backends = AwsBackends::connect(&config).await?;
//! let engine = backends.engine(&config);
//! ```

mod iam;
mod secrets_manager;
mod sns;

pub use iam::IamAuthority;
pub use secrets_manager::SecretsManagerStore;
pub use sns::SnsNotifier;

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region, SdkConfig};

use crate::config::{ConfigError, RotationConfig};
use crate::rotation::RotationEngine;

/// Load SDK configuration honoring the region and endpoint overrides
///
/// Credentials come from the default provider chain.
pub async fn load_sdk_config(config: &RotationConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    loader.load().await
}

/// The three AWS-backed capabilities, sharing one SDK configuration
#[derive(Debug, Clone)]
pub struct AwsBackends {
    /// IAM access keys
    pub authority: Arc<IamAuthority>,
    /// Secrets Manager secret per identity
    pub store: Arc<SecretsManagerStore>,
    /// SNS topic
    pub notifier: Arc<SnsNotifier>,
}

impl AwsBackends {
    /// Validate `config` and build clients for all three services
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration is invalid or has no
    /// notification topic.
    pub async fn connect(config: &RotationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let topic_arn = config.require_topic()?.to_string();

        let sdk_config = load_sdk_config(config).await;

        tracing::info!(
            provider = "AWS",
            region = config.region_label(),
            endpoint = ?config.endpoint_url,
            prefix = %config.secret_prefix,
            "Initialized AWS rotation backends"
        );

        Ok(Self {
            authority: Arc::new(IamAuthority::new(aws_sdk_iam::Client::new(&sdk_config))),
            store: Arc::new(SecretsManagerStore::new(
                aws_sdk_secretsmanager::Client::new(&sdk_config),
                config.secret_naming(),
            )),
            notifier: Arc::new(SnsNotifier::new(
                aws_sdk_sns::Client::new(&sdk_config),
                topic_arn,
            )),
        })
    }

    /// Engine wired to these backends
    pub fn engine(&self, config: &RotationConfig) -> RotationEngine {
        RotationEngine::new(
            self.authority.clone(),
            self.store.clone(),
            self.notifier.clone(),
            config,
        )
    }
}
