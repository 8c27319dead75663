//! Notification texts for rotation steps

use crate::config::{RotationConfig, SecretNaming};
use crate::core::{AccessKeyId, Identity};

/// A rendered notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// Renders the messages sent after `create` and `deactivate`
#[derive(Debug, Clone)]
pub struct MessageTemplates {
    region: String,
    naming: SecretNaming,
    grace_period_days: u32,
}

impl MessageTemplates {
    /// Take region, secret naming and grace period from configuration
    pub fn from_config(config: &RotationConfig) -> Self {
        Self {
            region: config.region_label().to_string(),
            naming: config.secret_naming(),
            grace_period_days: config.grace_period_days,
        }
    }

    /// New key issued and stored as current
    pub fn key_created(&self, identity: &Identity, key_id: &AccessKeyId) -> Message {
        let secret_id = self.naming.secret_id(identity);
        Message {
            subject: format!("AWS Access Key Rotation: New key is available for {identity}"),
            body: format!(
                "Hello,\n\n\
                 A new access key has been created for key rotation.\n\n\
                 Access Key Id: {key_id}\n\
                 Secrets Manager Secret Id: {secret_id}\n\n\
                 Please obtain the new access key information from Secrets Manager \
                 using the secret id above in {region} and update your application \
                 within {days} days to avoid interruption.\n",
                region = self.region,
                days = self.grace_period_days,
            ),
        }
    }

    /// Previous key marked inactive
    pub fn key_deactivated(&self, identity: &Identity, key_id: &AccessKeyId) -> Message {
        let secret_id = self.naming.secret_id(identity);
        Message {
            subject: format!("AWS Access Key Rotation: Previous key deactivated for {identity}"),
            body: format!(
                "Hello,\n\n\
                 The previous access key {key_id} has been disabled for {identity}.\n\n\
                 This key will be deleted in the next {days} days. If your application \
                 has lost access, be sure to update the access key.\n\
                 You can find the new key by looking up the secret \"{secret_id}\" in \
                 Secrets Manager in {region}.\n",
                region = self.region,
                days = self.grace_period_days,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn templates() -> MessageTemplates {
        MessageTemplates::from_config(&RotationConfig {
            region: Some("eu-west-1".into()),
            secret_prefix: "rotation/".into(),
            ..Default::default()
        })
    }

    #[test]
    fn created_message_names_key_secret_and_window() {
        let identity = Identity::new("svc-app").unwrap();
        let key = AccessKeyId::new("AKIANEW").unwrap();
        let message = templates().key_created(&identity, &key);

        assert_eq!(
            message.subject,
            "AWS Access Key Rotation: New key is available for svc-app"
        );
        assert!(message.body.contains("Access Key Id: AKIANEW"));
        assert!(message.body.contains("Secrets Manager Secret Id: rotation/svc-app"));
        assert!(message.body.contains("in eu-west-1"));
        assert!(message.body.contains("within 14 days"));
    }

    #[test]
    fn deactivated_message_warns_about_deletion() {
        let identity = Identity::new("svc-app").unwrap();
        let key = AccessKeyId::new("AKIAOLD").unwrap();
        let message = templates().key_deactivated(&identity, &key);

        assert_eq!(
            message.subject,
            "AWS Access Key Rotation: Previous key deactivated for svc-app"
        );
        assert!(
            message
                .body
                .contains("The previous access key AKIAOLD has been disabled for svc-app.")
        );
        assert!(message.body.contains("deleted in the next 14 days"));
        assert!(message.body.contains("\"rotation/svc-app\""));
    }

    #[test]
    fn secret_id_matches_store_naming() {
        let config = RotationConfig {
            secret_prefix: "team-a/keys/".into(),
            ..Default::default()
        };
        let identity = Identity::new("svc-app").unwrap();
        let key = AccessKeyId::new("AKIANEW").unwrap();
        let templates = MessageTemplates::from_config(&config);

        let secret_id = config.secret_id(&identity);
        assert_eq!(secret_id, "team-a/keys/svc-app");
        assert!(
            templates
                .key_created(&identity, &key)
                .body
                .contains(&format!("Secrets Manager Secret Id: {secret_id}\n"))
        );
        assert!(
            templates
                .key_deactivated(&identity, &key)
                .body
                .contains(&format!("\"{secret_id}\""))
        );
    }

    #[test]
    fn grace_period_follows_config() {
        let templates = MessageTemplates::from_config(&RotationConfig {
            grace_period_days: 7,
            ..Default::default()
        });
        let identity = Identity::new("svc-app").unwrap();
        let key = AccessKeyId::new("AKIANEW").unwrap();
        let body = templates.key_created(&identity, &key).body;
        assert!(body.contains("within 7 days"));
        assert!(body.contains("in the default region"));
    }
}
