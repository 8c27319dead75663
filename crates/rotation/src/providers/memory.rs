//! In-memory backends
//!
//! Stand-ins for the authority, the secret store and the notifier, used by
//! tests and by dry runs. Each one can be told to fail its next call of a
//! given kind and counts calls; an optional shared [`Journal`] records the
//! cross-backend call order.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use uuid::Uuid;

use crate::capability::{
    AuthorityError, CredentialAuthority, Notifier, NotifyError, SecretStore, StoreError,
};
use crate::core::{
    AccessKeyId, Identity, IssuedCredential, KeyStatus, KeySummary, SecretRecord, VersionStage,
};

/// Keys per identity, matching the IAM default
pub const DEFAULT_MAX_KEYS: usize = 2;

/// One capability call, as recorded by a [`Journal`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `CredentialAuthority::issue`
    Issue(String),
    /// `CredentialAuthority::set_status`
    SetStatus(String, KeyStatus),
    /// `CredentialAuthority::delete`
    DeleteKey(String),
    /// `CredentialAuthority::list`
    ListKeys,
    /// `SecretStore::write_current`
    WriteSecret,
    /// `SecretStore::read`
    ReadSecret(VersionStage),
    /// `Notifier::publish`
    Publish,
}

/// Shared, ordered log of capability calls
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: Call) {
        self.0.lock().push(call);
    }

    /// Calls recorded so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Call counter with a one-shot failure switch
#[derive(Debug, Default)]
struct Probe {
    fail_next: AtomicBool,
    calls: AtomicU32,
}

impl Probe {
    /// Count a call; `true` means this call must fail
    fn enter(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fail_next.swap(false, Ordering::SeqCst)
    }

    fn arm(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

fn mock_failure(operation: &'static str) -> AuthorityError {
    AuthorityError::Service {
        operation,
        message: "mock failure".into(),
    }
}

#[derive(Debug, Default)]
struct AuthorityState {
    keys: HashMap<Identity, Vec<KeySummary>>,
    serial: u64,
}

#[derive(Debug, Default)]
struct AuthorityProbes {
    issue: Probe,
    set_status: Probe,
    delete: Probe,
    list: Probe,
}

/// In-memory credential authority
///
/// Identities must be registered with [`MemoryAuthority::add_identity`] (or
/// implicitly through [`MemoryAuthority::seed_key`]); calls for unknown
/// identities fail with [`AuthorityError::NoSuchIdentity`].
#[derive(Debug, Clone)]
pub struct MemoryAuthority {
    state: Arc<Mutex<AuthorityState>>,
    probes: Arc<AuthorityProbes>,
    max_keys: usize,
    journal: Option<Journal>,
}

impl Default for MemoryAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuthority {
    /// Create an authority with no identities
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(AuthorityState::default())),
            probes: Arc::new(AuthorityProbes::default()),
            max_keys: DEFAULT_MAX_KEYS,
            journal: None,
        }
    }

    /// Change the per-identity key limit
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }

    /// Record calls into `journal`
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Register an identity with no keys
    pub fn add_identity(&self, identity: &Identity) {
        self.state.lock().keys.entry(identity.clone()).or_default();
    }

    /// Insert a pre-existing key, registering the identity if needed
    pub fn seed_key(&self, identity: &Identity, key_id: &AccessKeyId, status: KeyStatus) {
        self.state
            .lock()
            .keys
            .entry(identity.clone())
            .or_default()
            .push(KeySummary::new(key_id.clone(), status));
    }

    /// Snapshot of an identity's keys in authority order
    pub fn keys(&self, identity: &Identity) -> Vec<KeySummary> {
        self.state
            .lock()
            .keys
            .get(identity)
            .cloned()
            .unwrap_or_default()
    }

    /// Status of one key, if it exists
    pub fn status_of(&self, identity: &Identity, key_id: &AccessKeyId) -> Option<KeyStatus> {
        self.keys(identity)
            .into_iter()
            .find(|key| &key.id == key_id)
            .map(|key| key.status)
    }

    /// Make the next `issue` fail
    pub fn fail_next_issue(&self) {
        self.probes.issue.arm();
    }

    /// Make the next `set_status` fail
    pub fn fail_next_set_status(&self) {
        self.probes.set_status.arm();
    }

    /// Make the next `delete` fail
    pub fn fail_next_delete(&self) {
        self.probes.delete.arm();
    }

    /// Make the next `list` fail
    pub fn fail_next_list(&self) {
        self.probes.list.arm();
    }

    /// Number of `issue` calls
    pub fn issue_count(&self) -> u32 {
        self.probes.issue.count()
    }

    /// Number of `set_status` calls
    pub fn set_status_count(&self) -> u32 {
        self.probes.set_status.count()
    }

    /// Number of `delete` calls
    pub fn delete_count(&self) -> u32 {
        self.probes.delete.count()
    }

    /// Number of `list` calls
    pub fn list_count(&self) -> u32 {
        self.probes.list.count()
    }

    /// Total calls of any kind
    pub fn call_count(&self) -> u32 {
        self.issue_count() + self.set_status_count() + self.delete_count() + self.list_count()
    }

    fn journal(&self, call: Call) {
        if let Some(journal) = &self.journal {
            journal.record(call);
        }
    }
}

#[async_trait]
impl CredentialAuthority for MemoryAuthority {
    async fn issue(&self, identity: &Identity) -> Result<IssuedCredential, AuthorityError> {
        self.journal(Call::Issue(identity.to_string()));
        if self.probes.issue.enter() {
            return Err(mock_failure("issue"));
        }

        let mut state = self.state.lock();
        state.serial += 1;
        let serial = state.serial;
        let keys = state
            .keys
            .get_mut(identity)
            .ok_or_else(|| AuthorityError::NoSuchIdentity {
                identity: identity.to_string(),
            })?;
        if keys.len() >= self.max_keys {
            return Err(AuthorityError::LimitExceeded {
                identity: identity.to_string(),
            });
        }

        let id = AccessKeyId::new(format!("AKIAMEMORY{serial:010}")).map_err(|e| {
            AuthorityError::UnexpectedResponse {
                operation: "issue",
                reason: e.to_string(),
            }
        })?;
        keys.push(KeySummary::new(id.clone(), KeyStatus::Active));
        Ok(IssuedCredential::new(id, format!("memory-{}", Uuid::new_v4())))
    }

    async fn set_status(
        &self,
        key_id: &AccessKeyId,
        identity: &Identity,
        status: KeyStatus,
    ) -> Result<(), AuthorityError> {
        self.journal(Call::SetStatus(key_id.to_string(), status));
        if self.probes.set_status.enter() {
            return Err(mock_failure("set_status"));
        }

        let mut state = self.state.lock();
        let key = state
            .keys
            .get_mut(identity)
            .and_then(|keys| keys.iter_mut().find(|key| &key.id == key_id))
            .ok_or_else(|| AuthorityError::NoSuchKey {
                identity: identity.to_string(),
                key_id: key_id.to_string(),
            })?;
        key.status = status;
        Ok(())
    }

    async fn delete(
        &self,
        key_id: &AccessKeyId,
        identity: &Identity,
    ) -> Result<(), AuthorityError> {
        self.journal(Call::DeleteKey(key_id.to_string()));
        if self.probes.delete.enter() {
            return Err(mock_failure("delete"));
        }

        let mut state = self.state.lock();
        let keys = state
            .keys
            .get_mut(identity)
            .ok_or_else(|| AuthorityError::NoSuchIdentity {
                identity: identity.to_string(),
            })?;
        let before = keys.len();
        keys.retain(|key| &key.id != key_id);
        if keys.len() == before {
            return Err(AuthorityError::NoSuchKey {
                identity: identity.to_string(),
                key_id: key_id.to_string(),
            });
        }
        Ok(())
    }

    async fn list(&self, identity: &Identity) -> Result<Vec<KeySummary>, AuthorityError> {
        self.journal(Call::ListKeys);
        if self.probes.list.enter() {
            return Err(mock_failure("list"));
        }

        self.state
            .lock()
            .keys
            .get(identity)
            .cloned()
            .ok_or_else(|| AuthorityError::NoSuchIdentity {
                identity: identity.to_string(),
            })
    }
}

/// In-memory versioned secret store
///
/// Keeps every generation ever written; the last one is `current` and the
/// one before it is `previous`.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    secrets: Arc<Mutex<HashMap<Identity, Vec<SecretRecord>>>>,
    write: Arc<Probe>,
    read: Arc<Probe>,
    journal: Option<Journal>,
}

impl MemorySecretStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record calls into `journal`
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Append a generation directly, bypassing counters and failure switches
    pub fn seed(&self, identity: &Identity, record: SecretRecord) {
        self.secrets
            .lock()
            .entry(identity.clone())
            .or_default()
            .push(record);
    }

    /// Append a generation holding `key_id` with a placeholder secret
    pub fn seed_key(&self, identity: &Identity, key_id: &AccessKeyId) {
        let credential = IssuedCredential::new(key_id.clone(), "seeded");
        if let Ok(record) = SecretRecord::seal(&credential) {
            self.seed(identity, record);
        }
    }

    /// Key id carried by the generation at `stage`
    pub fn key_id_at(&self, identity: &Identity, stage: VersionStage) -> Option<AccessKeyId> {
        self.record_at(identity, stage)
            .and_then(|record| record.access_key_id().ok())
    }

    /// Number of generations written for `identity`
    pub fn generations(&self, identity: &Identity) -> usize {
        self.secrets.lock().get(identity).map_or(0, Vec::len)
    }

    /// Make the next `write_current` fail
    pub fn fail_next_write(&self) {
        self.write.arm();
    }

    /// Make the next `read` fail
    pub fn fail_next_read(&self) {
        self.read.arm();
    }

    /// Number of `write_current` calls
    pub fn write_count(&self) -> u32 {
        self.write.count()
    }

    /// Number of `read` calls
    pub fn read_count(&self) -> u32 {
        self.read.count()
    }

    fn record_at(&self, identity: &Identity, stage: VersionStage) -> Option<SecretRecord> {
        let secrets = self.secrets.lock();
        let versions = secrets.get(identity)?;
        let back = match stage {
            VersionStage::Current => 1,
            VersionStage::Previous => 2,
        };
        versions
            .len()
            .checked_sub(back)
            .and_then(|index| versions.get(index))
            .cloned()
    }

    fn journal(&self, call: Call) {
        if let Some(journal) = &self.journal {
            journal.record(call);
        }
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn write_current(
        &self,
        identity: &Identity,
        record: &SecretRecord,
    ) -> Result<(), StoreError> {
        self.journal(Call::WriteSecret);
        if self.write.enter() {
            return Err(StoreError::Service {
                operation: "write_current",
                secret_id: identity.to_string(),
                message: "mock failure".into(),
            });
        }

        self.seed(identity, record.clone());
        Ok(())
    }

    async fn read(
        &self,
        identity: &Identity,
        stage: VersionStage,
    ) -> Result<SecretRecord, StoreError> {
        self.journal(Call::ReadSecret(stage));
        if self.read.enter() {
            return Err(StoreError::Service {
                operation: "read",
                secret_id: identity.to_string(),
                message: "mock failure".into(),
            });
        }

        self.record_at(identity, stage)
            .ok_or_else(|| StoreError::NotFound {
                secret_id: identity.to_string(),
                stage,
            })
    }
}

/// A message accepted by [`MemoryNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Subject line
    pub subject: String,
    /// Body
    pub body: String,
}

/// In-memory notifier that keeps every published message
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    publish: Arc<Probe>,
    journal: Option<Journal>,
}

impl MemoryNotifier {
    /// Create a notifier with an empty outbox
    pub fn new() -> Self {
        Self::default()
    }

    /// Record calls into `journal`
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Messages accepted so far
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    /// Make the next `publish` fail
    pub fn fail_next_publish(&self) {
        self.publish.arm();
    }

    /// Number of `publish` calls, failed ones included
    pub fn publish_count(&self) -> u32 {
        self.publish.count()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn publish(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        if let Some(journal) = &self.journal {
            journal.record(Call::Publish);
        }
        if self.publish.enter() {
            return Err(NotifyError::Service {
                message: "mock failure".into(),
            });
        }

        self.sent.lock().push(SentMessage {
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
