//! Integration tests for request dispatch

use async_trait::async_trait;
use keyturn_rotation::providers::memory::{MemoryAuthority, MemoryNotifier, MemorySecretStore};
use keyturn_rotation::{
    AccessKeyId, AuthorityError, CredentialAuthority, Dispatcher, Identity, IssuedCredential,
    KeyStatus, KeySummary, Notifier, NotifyError, RotationConfig, RotationEngine,
    RotationRequest, RotationResponse, SecretRecord, SecretStore, StoreError, VersionStage,
};
use mockall::mock;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;

mock! {
    pub Authority {}

    #[async_trait]
    impl CredentialAuthority for Authority {
        async fn issue(&self, identity: &Identity) -> Result<IssuedCredential, AuthorityError>;
        async fn set_status(
            &self,
            key_id: &AccessKeyId,
            identity: &Identity,
            status: KeyStatus,
        ) -> Result<(), AuthorityError>;
        async fn delete(&self, key_id: &AccessKeyId, identity: &Identity)
            -> Result<(), AuthorityError>;
        async fn list(&self, identity: &Identity) -> Result<Vec<KeySummary>, AuthorityError>;
    }
}

mock! {
    pub Store {}

    #[async_trait]
    impl SecretStore for Store {
        async fn write_current(
            &self,
            identity: &Identity,
            record: &SecretRecord,
        ) -> Result<(), StoreError>;
        async fn read(
            &self,
            identity: &Identity,
            stage: VersionStage,
        ) -> Result<SecretRecord, StoreError>;
    }
}

mock! {
    pub Notify {}

    #[async_trait]
    impl Notifier for Notify {
        async fn publish(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
    }
}

/// Dispatcher whose capabilities panic on any call
fn untouchable() -> Dispatcher {
    Dispatcher::new(RotationEngine::new(
        Arc::new(MockAuthority::new()),
        Arc::new(MockStore::new()),
        Arc::new(MockNotify::new()),
        &RotationConfig::default(),
    ))
}

fn memory() -> (Dispatcher, MemoryAuthority, MemorySecretStore, MemoryNotifier) {
    let authority = MemoryAuthority::new();
    let store = MemorySecretStore::new();
    let notifier = MemoryNotifier::new();
    let engine = RotationEngine::new(
        Arc::new(authority.clone()),
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
        &RotationConfig::default(),
    );
    (Dispatcher::new(engine), authority, store, notifier)
}

#[rstest]
#[case::unknown_action(json!({"action": "rotate", "username": "svc-app"}))]
#[case::wrong_case(json!({"action": "CREATE", "username": "svc-app"}))]
#[case::missing_username(json!({"action": "create"}))]
#[case::missing_action(json!({"username": "svc-app"}))]
#[case::empty_username(json!({"action": "create", "username": ""}))]
#[case::not_an_object(json!("create"))]
#[tokio::test]
async fn test_refused_event_returns_500_without_calls(#[case] event: serde_json::Value) {
    let response = untouchable().handle_event(event).await;
    assert_eq!(response, RotationResponse { status: 500 });
}

#[tokio::test]
async fn test_create_failure_maps_to_500() {
    let mut authority = MockAuthority::new();
    authority.expect_issue().times(1).returning(|identity| {
        Err(AuthorityError::NoSuchIdentity {
            identity: identity.to_string(),
        })
    });

    let dispatcher = Dispatcher::new(RotationEngine::new(
        Arc::new(authority),
        Arc::new(MockStore::new()),
        Arc::new(MockNotify::new()),
        &RotationConfig::default(),
    ));

    let response = dispatcher
        .dispatch(&RotationRequest::new("create".to_string(), "ghost"))
        .await;
    assert_eq!(response.status, 500);
}

#[tokio::test]
async fn test_delete_mismatch_maps_to_400() {
    let mut store = MockStore::new();
    store
        .expect_read()
        .withf(|_, stage| *stage == VersionStage::Previous)
        .times(1)
        .returning(|_, _| {
            let key = AccessKeyId::new("AKIAK0").unwrap();
            Ok(SecretRecord::seal(&IssuedCredential::new(key, "secret")).unwrap())
        });

    let mut authority = MockAuthority::new();
    authority.expect_list().times(1).returning(|_| {
        Ok(vec![KeySummary::new(
            AccessKeyId::new("AKIAKX").unwrap(),
            KeyStatus::Inactive,
        )])
    });
    authority.expect_delete().never();

    let dispatcher = Dispatcher::new(RotationEngine::new(
        Arc::new(authority),
        Arc::new(store),
        Arc::new(MockNotify::new()),
        &RotationConfig::default(),
    ));

    let response = dispatcher
        .handle_event(json!({"action": "delete", "username": "svc-app"}))
        .await;
    assert_eq!(response.status, 400);
}

#[tokio::test]
async fn test_rotation_cycle_through_events() {
    let (dispatcher, authority, store, notifier) = memory();
    let identity = Identity::new("svc-app").unwrap();
    let k0 = AccessKeyId::new("AKIAINITIAL0").unwrap();
    authority.seed_key(&identity, &k0, KeyStatus::Active);
    store.seed_key(&identity, &k0);

    for action in ["create", "deactivate", "delete"] {
        let response = dispatcher
            .handle_event(json!({"action": action, "username": "svc-app"}))
            .await;
        assert_eq!(response.status, 200, "{action} failed");
    }

    let keys = authority.keys(&identity);
    assert_eq!(keys.len(), 1);
    assert_ne!(keys[0].id, k0);
    assert_eq!(keys[0].status, KeyStatus::Active);
    assert_eq!(
        store.key_id_at(&identity, VersionStage::Current),
        Some(keys[0].id.clone())
    );
    assert_eq!(notifier.sent().len(), 2);
}

#[tokio::test]
async fn test_dispatch_report_exposes_progress() {
    let (dispatcher, authority, store, _) = memory();
    let identity = Identity::new("svc-app").unwrap();
    authority.add_identity(&identity);
    store.fail_next_write();

    let report = dispatcher
        .dispatch_report(&RotationRequest::new("create".to_string(), "svc-app"))
        .await
        .unwrap();

    assert!(report.is_partial());
    assert_eq!(report.identity, identity);
    assert!(
        dispatcher
            .dispatch_report(&RotationRequest::new("rotate".to_string(), "svc-app"))
            .await
            .is_none()
    );
}

/// Formatted log output collected in memory
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_request_fields_are_logged_escaped() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .without_time()
        .finish();
    let _default = tracing::subscriber::set_default(subscriber);

    let response = untouchable()
        .handle_event(json!({
            "action": "create\nINFO forged action",
            "username": "svc-app\nINFO forged username",
        }))
        .await;
    assert_eq!(response.status, 500);

    let output = logs.contents();
    assert!(output.contains("Detected username"));
    assert!(output.contains(r"svc-app\nINFO forged username"));
    assert!(output.contains(r"create\nINFO forged action"));
    assert!(!output.lines().any(|line| line.starts_with("INFO forged")));
}
