//! Secrets Manager secret store

use async_trait::async_trait;
use aws_sdk_secretsmanager::Client;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use secrecy::{ExposeSecret, SecretString};

use crate::capability::{SecretStore, StoreError};
use crate::config::SecretNaming;
use crate::core::{Identity, SecretRecord, VersionStage};

/// One Secrets Manager secret per identity, named `<prefix><identity>`
///
/// `PutSecretValue` moves `AWSCURRENT` onto the new version and
/// `AWSPREVIOUS` onto the old one, which is exactly the demotion the engine
/// relies on.
#[derive(Debug, Clone)]
pub struct SecretsManagerStore {
    client: Client,
    naming: SecretNaming,
}

impl SecretsManagerStore {
    /// Wrap a Secrets Manager client
    pub fn new(client: Client, naming: SecretNaming) -> Self {
        Self { client, naming }
    }

    fn secret_id(&self, identity: &Identity) -> String {
        self.naming.secret_id(identity)
    }
}

fn service_error(
    operation: &'static str,
    secret_id: &str,
    err: impl std::error::Error,
) -> StoreError {
    StoreError::Service {
        operation,
        secret_id: secret_id.to_string(),
        message: DisplayErrorContext(err).to_string(),
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    #[tracing::instrument(skip(self, record), fields(provider = "SecretsManager", identity = %identity))]
    async fn write_current(
        &self,
        identity: &Identity,
        record: &SecretRecord,
    ) -> Result<(), StoreError> {
        let secret_id = self.secret_id(identity);
        let payload = record.payload().expose_secret();

        let update = self
            .client
            .put_secret_value()
            .secret_id(&secret_id)
            .secret_string(payload)
            .send()
            .await;

        match update {
            Ok(_) => {
                tracing::debug!(secret = %secret_id, "Wrote new secret version");
                Ok(())
            }
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                // First rotation for this identity: the secret does not exist yet
                self.client
                    .create_secret()
                    .name(&secret_id)
                    .secret_string(payload)
                    .send()
                    .await
                    .map_err(|err| service_error("CreateSecret", &secret_id, &err))?;

                tracing::info!(secret = %secret_id, "Created secret");
                Ok(())
            }
            Err(err) => Err(service_error("PutSecretValue", &secret_id, &err)),
        }
    }

    #[tracing::instrument(skip(self), fields(provider = "SecretsManager", identity = %identity, stage = %stage))]
    async fn read(
        &self,
        identity: &Identity,
        stage: VersionStage,
    ) -> Result<SecretRecord, StoreError> {
        let secret_id = self.secret_id(identity);

        let output = self
            .client
            .get_secret_value()
            .secret_id(&secret_id)
            .version_stage(stage.aws_label())
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(e) if e.is_resource_not_found_exception() => StoreError::NotFound {
                    secret_id: secret_id.clone(),
                    stage,
                },
                _ => service_error("GetSecretValue", &secret_id, &err),
            })?;

        let value = output
            .secret_string()
            .ok_or_else(|| StoreError::NotAString {
                secret_id: secret_id.clone(),
            })?;

        Ok(SecretRecord::from_payload(SecretString::from(
            value.to_string(),
        )))
    }
}
