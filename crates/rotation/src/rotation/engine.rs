//! Rotation engine
//!
//! Implements the three transitions over the injected capabilities:
//!
//! - `create`: issue → write current → notify
//! - `deactivate`: read previous → set inactive → notify
//! - `delete`: read previous → list → delete the matching inactive key
//!
//! Each step consumes the previous step's output, so the sequence is strictly
//! linear and a failure stops everything after it. Nothing is rolled back and
//! nothing is retried here; the report records how far the operation got.
//!
//! # Preconditions
//!
//! At most one operation per identity may be in flight. Pass a
//! [`LocalIdentityLock`](super::LocalIdentityLock) via
//! [`RotationEngine::with_lock`] to enforce this inside one process; across
//! processes it is the trigger's job.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::error::{RotationError, RotationResult};
use super::lock::{IdentityLock, NoopLock};
use super::messages::MessageTemplates;
use super::report::{Progress, RotationReport};
use crate::capability::{CredentialAuthority, Notifier, SecretStore};
use crate::config::RotationConfig;
use crate::core::{
    AccessKeyId, Identity, KeyStatus, Operation, RotationOutcome, SecretRecord, VersionStage,
};

/// Drives key rotation across authority, secret store and notifier
#[derive(Clone)]
pub struct RotationEngine {
    authority: Arc<dyn CredentialAuthority>,
    store: Arc<dyn SecretStore>,
    notifier: Arc<dyn Notifier>,
    lock: Arc<dyn IdentityLock>,
    messages: MessageTemplates,
}

impl std::fmt::Debug for RotationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationEngine")
            .field("messages", &self.messages)
            .finish_non_exhaustive()
    }
}

impl RotationEngine {
    /// Assemble an engine from its three capabilities
    ///
    /// Starts with [`NoopLock`]: callers are trusted to serialize per identity.
    pub fn new(
        authority: Arc<dyn CredentialAuthority>,
        store: Arc<dyn SecretStore>,
        notifier: Arc<dyn Notifier>,
        config: &RotationConfig,
    ) -> Self {
        Self {
            authority,
            store,
            notifier,
            lock: Arc::new(NoopLock),
            messages: MessageTemplates::from_config(config),
        }
    }

    /// Replace the per-identity lock
    pub fn with_lock(mut self, lock: Arc<dyn IdentityLock>) -> Self {
        self.lock = lock;
        self
    }

    /// Issue a new key, store it as current and announce it
    pub async fn create(&self, identity: &Identity) -> RotationReport {
        self.run(Operation::Create, identity).await
    }

    /// Deactivate the key recorded as previous and announce it
    pub async fn deactivate(&self, identity: &Identity) -> RotationReport {
        self.run(Operation::Deactivate, identity).await
    }

    /// Delete the inactive key recorded as previous
    pub async fn delete(&self, identity: &Identity) -> RotationReport {
        self.run(Operation::Delete, identity).await
    }

    /// Run one operation to completion or failure
    #[tracing::instrument(skip(self), fields(identity = %identity, operation = %operation))]
    pub async fn run(&self, operation: Operation, identity: &Identity) -> RotationReport {
        let mut report = RotationReport::begin(operation, identity.clone());

        let result = match self.lock.try_acquire(identity) {
            Ok(_lease) => match operation {
                Operation::Create => self.create_key(identity, &mut report).await,
                Operation::Deactivate => self.deactivate_key(identity, &mut report).await,
                Operation::Delete => self.delete_key(identity, &mut report).await,
            },
            Err(err) => Err(err),
        };

        report.finish(result);
        log_report(&report);
        report
    }

    async fn create_key(
        &self,
        identity: &Identity,
        report: &mut RotationReport,
    ) -> RotationResult<()> {
        let issued = self.authority.issue(identity).await?;
        let key_id = issued.id.clone();
        report.subject(&key_id);
        report.advance(Progress::AuthorityMutated);
        info!(access_key_id = %key_id, "Issued new access key");

        let record = SecretRecord::seal(&issued).map_err(RotationError::Seal)?;
        drop(issued);
        self.store.write_current(identity, &record).await?;
        report.advance(Progress::StoreUpdated);
        debug!(access_key_id = %key_id, "Stored new access key as current");

        let message = self.messages.key_created(identity, &key_id);
        self.publish(&key_id, &message.subject, &message.body).await?;
        report.advance(Progress::Completed);

        info!(access_key_id = %key_id, "New access key has been created");
        Ok(())
    }

    async fn deactivate_key(
        &self,
        identity: &Identity,
        report: &mut RotationReport,
    ) -> RotationResult<()> {
        let key_id = self.previous_key_id(identity).await?;
        report.subject(&key_id);
        info!(access_key_id = %key_id, "Deactivating previous access key");

        self.authority
            .set_status(&key_id, identity, KeyStatus::Inactive)
            .await?;
        report.advance(Progress::AuthorityMutated);

        let message = self.messages.key_deactivated(identity, &key_id);
        self.publish(&key_id, &message.subject, &message.body).await?;
        report.advance(Progress::Completed);

        info!(access_key_id = %key_id, "Previous access key has been deactivated");
        Ok(())
    }

    async fn delete_key(
        &self,
        identity: &Identity,
        report: &mut RotationReport,
    ) -> RotationResult<()> {
        let expected = self.previous_key_id(identity).await?;
        report.subject(&expected);
        debug!(access_key_id = %expected, "Previous access key from secret store");

        let keys = self.authority.list(identity).await?;

        // First inactive key decides: match deletes, mismatch halts. Active keys
        // are never candidates.
        for key in keys {
            debug!(access_key_id = %key.id, status = %key.status, "Inspecting access key");
            match key.status {
                KeyStatus::Active => {
                    debug!(access_key_id = %key.id, "Access key is still active, skipping");
                }
                KeyStatus::Inactive if key.id == expected => {
                    self.authority.delete(&key.id, identity).await?;
                    report.advance(Progress::Completed);
                    info!(access_key_id = %key.id, "Previous access key has been deleted");
                    return Ok(());
                }
                KeyStatus::Inactive => {
                    return Err(RotationError::ConsistencyViolation {
                        expected,
                        found: key.id,
                    });
                }
            }
        }

        info!(access_key_id = %expected, "No inactive access key to delete");
        Ok(())
    }

    async fn previous_key_id(&self, identity: &Identity) -> RotationResult<AccessKeyId> {
        let record = self.store.read(identity, VersionStage::Previous).await?;
        record
            .access_key_id()
            .map_err(|source| RotationError::MalformedRecord {
                stage: VersionStage::Previous,
                source,
            })
    }

    async fn publish(
        &self,
        key_id: &AccessKeyId,
        subject: &str,
        body: &str,
    ) -> RotationResult<()> {
        self.notifier
            .publish(subject, body)
            .await
            .map_err(|source| RotationError::Notify {
                key_id: key_id.clone(),
                source,
            })
    }
}

fn log_report(report: &RotationReport) {
    let key = report
        .access_key_id
        .as_ref()
        .map(AccessKeyId::as_str)
        .unwrap_or("-");

    match (&report.error, report.outcome()) {
        (None, _) => info!(
            rotation_id = %report.rotation_id,
            access_key_id = key,
            status = 200,
            "Rotation step completed"
        ),
        (Some(err), RotationOutcome::Inconsistent) => error!(
            rotation_id = %report.rotation_id,
            access_key_id = key,
            status = 400,
            error = %err,
            "Secret store previous value does not match the inactive authority key"
        ),
        (Some(err), outcome) if report.is_partial() => warn!(
            rotation_id = %report.rotation_id,
            access_key_id = key,
            status = outcome.status_code(),
            progress = %report.progress,
            kind = err.kind(),
            error = %err,
            "Rotation step failed after changing external state"
        ),
        (Some(err), outcome) => error!(
            rotation_id = %report.rotation_id,
            access_key_id = key,
            status = outcome.status_code(),
            kind = err.kind(),
            error = %err,
            "Rotation step failed"
        ),
    }
}
