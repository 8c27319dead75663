//! Per-identity serialization
//!
//! Two rotations for the same identity must not overlap: concurrent `create`
//! calls race on the store's current/previous promotion and leave `previous`
//! pointing at neither key deterministically. The trigger is expected to
//! serialize per identity; [`IdentityLock`] makes that contract explicit and
//! lets a process that runs several rotations enforce it locally.

use dashmap::DashSet;
use std::fmt;
use std::sync::Arc;

use super::error::{RotationError, RotationResult};
use crate::core::Identity;

/// Grants at most one in-flight rotation per identity
pub trait IdentityLock: Send + Sync {
    /// Acquire the identity or fail with [`RotationError::ConcurrentRotation`]
    ///
    /// Never waits: a held identity is reported, not queued.
    fn try_acquire(&self, identity: &Identity) -> RotationResult<IdentityLease>;
}

/// Held lock; releases on drop
pub struct IdentityLease {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl IdentityLease {
    /// Lease with nothing to release
    pub fn unguarded() -> Self {
        Self { release: None }
    }

    /// Lease that runs `release` when dropped
    pub fn on_release(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for IdentityLease {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for IdentityLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityLease")
            .field("guarded", &self.release.is_some())
            .finish()
    }
}

/// Lock that always grants; serialization is left to the trigger
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLock;

impl IdentityLock for NoopLock {
    fn try_acquire(&self, _identity: &Identity) -> RotationResult<IdentityLease> {
        Ok(IdentityLease::unguarded())
    }
}

/// In-process lock keyed by identity
///
/// Only covers rotations sharing this instance; it does nothing for a second
/// process or host.
#[derive(Debug, Clone, Default)]
pub struct LocalIdentityLock {
    held: Arc<DashSet<Identity>>,
}

impl LocalIdentityLock {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `identity` is currently held
    pub fn is_held(&self, identity: &Identity) -> bool {
        self.held.contains(identity)
    }
}

impl IdentityLock for LocalIdentityLock {
    fn try_acquire(&self, identity: &Identity) -> RotationResult<IdentityLease> {
        if !self.held.insert(identity.clone()) {
            return Err(RotationError::ConcurrentRotation {
                identity: identity.clone(),
            });
        }

        let held = Arc::clone(&self.held);
        let identity = identity.clone();
        Ok(IdentityLease::on_release(move || {
            held.remove(&identity);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: &str) -> Identity {
        Identity::new(name).unwrap()
    }

    #[test]
    fn second_acquire_fails_until_release() {
        let lock = LocalIdentityLock::new();
        let app = identity("svc-app");

        let lease = lock.try_acquire(&app).unwrap();
        assert!(lock.is_held(&app));
        assert!(matches!(
            lock.try_acquire(&app),
            Err(RotationError::ConcurrentRotation { .. })
        ));

        drop(lease);
        assert!(!lock.is_held(&app));
        assert!(lock.try_acquire(&app).is_ok());
    }

    #[test]
    fn identities_are_independent() {
        let lock = LocalIdentityLock::new();
        let _a = lock.try_acquire(&identity("svc-a")).unwrap();
        assert!(lock.try_acquire(&identity("svc-b")).is_ok());
    }

    #[test]
    fn noop_lock_always_grants() {
        let app = identity("svc-app");
        let _first = NoopLock.try_acquire(&app).unwrap();
        assert!(NoopLock.try_acquire(&app).is_ok());
    }
}
