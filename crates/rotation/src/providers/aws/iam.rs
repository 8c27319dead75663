//! IAM credential authority

use async_trait::async_trait;
use aws_sdk_iam::Client;
use aws_sdk_iam::error::DisplayErrorContext;
use aws_sdk_iam::types::{AccessKeyMetadata, StatusType};

use crate::capability::{AuthorityError, CredentialAuthority};
use crate::core::{AccessKeyId, Identity, IssuedCredential, KeyStatus, KeySummary};

/// Access keys of IAM users; the identity is the IAM user name
#[derive(Debug, Clone)]
pub struct IamAuthority {
    client: Client,
}

impl IamAuthority {
    /// Wrap an IAM client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn service_error(operation: &'static str, err: impl std::error::Error) -> AuthorityError {
    AuthorityError::Service {
        operation,
        message: DisplayErrorContext(err).to_string(),
    }
}

fn no_such_identity(identity: &Identity) -> AuthorityError {
    AuthorityError::NoSuchIdentity {
        identity: identity.to_string(),
    }
}

fn no_such_key(identity: &Identity, key_id: &AccessKeyId) -> AuthorityError {
    AuthorityError::NoSuchKey {
        identity: identity.to_string(),
        key_id: key_id.to_string(),
    }
}

fn status_type(status: KeyStatus) -> StatusType {
    match status {
        KeyStatus::Active => StatusType::Active,
        KeyStatus::Inactive => StatusType::Inactive,
    }
}

fn summarize(metadata: &AccessKeyMetadata) -> Result<KeySummary, AuthorityError> {
    let unexpected = |reason: String| AuthorityError::UnexpectedResponse {
        operation: "ListAccessKeys",
        reason,
    };

    let id = metadata
        .access_key_id()
        .ok_or_else(|| unexpected("key metadata without an access key id".into()))?;
    let id = AccessKeyId::new(id).map_err(|e| unexpected(e.to_string()))?;

    let status = match metadata.status() {
        Some(StatusType::Active) => KeyStatus::Active,
        Some(StatusType::Inactive) => KeyStatus::Inactive,
        other => return Err(unexpected(format!("key {id} has status {other:?}"))),
    };

    Ok(KeySummary::new(id, status))
}

#[async_trait]
impl CredentialAuthority for IamAuthority {
    #[tracing::instrument(skip(self), fields(provider = "IAM", identity = %identity))]
    async fn issue(&self, identity: &Identity) -> Result<IssuedCredential, AuthorityError> {
        let output = self
            .client
            .create_access_key()
            .user_name(identity.as_str())
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(e) if e.is_no_such_entity_exception() => no_such_identity(identity),
                Some(e) if e.is_limit_exceeded_exception() => AuthorityError::LimitExceeded {
                    identity: identity.to_string(),
                },
                _ => service_error("CreateAccessKey", &err),
            })?;

        let key = output
            .access_key()
            .ok_or_else(|| AuthorityError::UnexpectedResponse {
                operation: "CreateAccessKey",
                reason: "response carries no access key".into(),
            })?;

        let id = AccessKeyId::new(key.access_key_id()).map_err(|e| {
            AuthorityError::UnexpectedResponse {
                operation: "CreateAccessKey",
                reason: e.to_string(),
            }
        })?;

        Ok(IssuedCredential::new(id, key.secret_access_key()))
    }

    #[tracing::instrument(skip(self), fields(provider = "IAM", identity = %identity, access_key_id = %key_id))]
    async fn set_status(
        &self,
        key_id: &AccessKeyId,
        identity: &Identity,
        status: KeyStatus,
    ) -> Result<(), AuthorityError> {
        self.client
            .update_access_key()
            .user_name(identity.as_str())
            .access_key_id(key_id.as_str())
            .status(status_type(status))
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(e) if e.is_no_such_entity_exception() => no_such_key(identity, key_id),
                _ => service_error("UpdateAccessKey", &err),
            })?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(provider = "IAM", identity = %identity, access_key_id = %key_id))]
    async fn delete(
        &self,
        key_id: &AccessKeyId,
        identity: &Identity,
    ) -> Result<(), AuthorityError> {
        self.client
            .delete_access_key()
            .user_name(identity.as_str())
            .access_key_id(key_id.as_str())
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(e) if e.is_no_such_entity_exception() => no_such_key(identity, key_id),
                _ => service_error("DeleteAccessKey", &err),
            })?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(provider = "IAM", identity = %identity))]
    async fn list(&self, identity: &Identity) -> Result<Vec<KeySummary>, AuthorityError> {
        let mut keys = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .client
                .list_access_keys()
                .user_name(identity.as_str())
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|err| match err.as_service_error() {
                    Some(e) if e.is_no_such_entity_exception() => no_such_identity(identity),
                    _ => service_error("ListAccessKeys", &err),
                })?;

            for metadata in output.access_key_metadata() {
                keys.push(summarize(metadata)?);
            }

            match output.marker() {
                Some(next) if output.is_truncated() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        tracing::debug!(count = keys.len(), "Listed access keys");
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_metadata() {
        let metadata = AccessKeyMetadata::builder()
            .access_key_id("AKIA0")
            .status(StatusType::Inactive)
            .build();

        let summary = summarize(&metadata).unwrap();
        assert_eq!(summary.id.as_str(), "AKIA0");
        assert_eq!(summary.status, KeyStatus::Inactive);
    }

    #[test]
    fn metadata_without_id_is_unexpected() {
        let metadata = AccessKeyMetadata::builder()
            .status(StatusType::Active)
            .build();

        assert!(matches!(
            summarize(&metadata),
            Err(AuthorityError::UnexpectedResponse { .. })
        ));
    }

    #[test]
    fn metadata_without_status_is_unexpected() {
        let metadata = AccessKeyMetadata::builder().access_key_id("AKIA0").build();
        assert!(summarize(&metadata).is_err());
    }

    #[test]
    fn maps_statuses() {
        assert_eq!(status_type(KeyStatus::Active), StatusType::Active);
        assert_eq!(status_type(KeyStatus::Inactive), StatusType::Inactive);
    }
}
