//! Backend selection

use keyturn_rotation::providers::memory::{MemoryAuthority, MemoryNotifier, MemorySecretStore};
use keyturn_rotation::{Dispatcher, Identity, RotationConfig, RotationEngine};
use std::sync::Arc;
use tracing::warn;

/// Dispatcher plus what the selected backends need before each request
///
/// One process handles one request, so the engine keeps its default no-op
/// identity lock; the trigger serializes rotations per identity.
pub struct Runtime {
    pub dispatcher: Dispatcher,
    dry_run: Option<MemoryAuthority>,
}

impl Runtime {
    /// In-memory backends; nothing leaves the process
    pub fn dry_run(config: &RotationConfig) -> Self {
        let authority = MemoryAuthority::new();
        let engine = RotationEngine::new(
            Arc::new(authority.clone()),
            Arc::new(MemorySecretStore::new()),
            Arc::new(MemoryNotifier::new()),
            config,
        );

        Self {
            dispatcher: Dispatcher::new(engine),
            dry_run: Some(authority),
        }
    }

    /// In-memory backends for a dry run, otherwise the cloud backends
    ///
    /// # Errors
    ///
    /// Fails when the cloud backends cannot be configured, or when they were
    /// not compiled in and no dry run was asked for.
    pub async fn connect(config: &RotationConfig, dry_run: bool) -> anyhow::Result<Self> {
        if dry_run {
            warn!("Dry run requested, using in-memory backends");
            return Ok(Self::dry_run(config));
        }
        Self::cloud(config).await
    }

    #[cfg(feature = "aws")]
    async fn cloud(config: &RotationConfig) -> anyhow::Result<Self> {
        let backends = keyturn_rotation::providers::AwsBackends::connect(config).await?;
        Ok(Self {
            dispatcher: Dispatcher::new(backends.engine(config)),
            dry_run: None,
        })
    }

    #[cfg(not(feature = "aws"))]
    #[allow(clippy::unused_async)]
    async fn cloud(_config: &RotationConfig) -> anyhow::Result<Self> {
        anyhow::bail!("built without the aws feature; pass --dry-run")
    }

    /// Make `username` known to the in-memory authority
    pub fn admit(&self, username: &str) {
        if let Some(authority) = &self.dry_run
            && let Ok(identity) = Identity::new(username)
        {
            authority.add_identity(&identity);
        }
    }

    /// Whether requests go to in-memory backends
    pub fn is_dry_run(&self) -> bool {
        self.dry_run.is_some()
    }
}
