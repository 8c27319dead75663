//! Rotation report
//!
//! The wire protocol only carries 200/400/500, which cannot tell "nothing
//! happened" from "a key was issued but never stored". [`RotationReport`]
//! keeps that distinction for logs and for callers that can use it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::error::{RotationError, RotationResult};
use crate::core::{AccessKeyId, Identity, Operation, RotationOutcome};

/// Unique identifier for one engine invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct RotationId(Uuid);

impl RotationId {
    /// Generate a new rotation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RotationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Last external mutation that is known to have been applied
///
/// Ordered: a later variant implies every earlier step of the same operation
/// succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    /// No external state was changed
    NothingApplied,
    /// The authority was changed; the store does not reflect it yet
    AuthorityMutated,
    /// Authority and store agree; the notification is outstanding
    StoreUpdated,
    /// Every step of the operation ran
    Completed,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Progress::NothingApplied => "nothing_applied",
            Progress::AuthorityMutated => "authority_mutated",
            Progress::StoreUpdated => "store_updated",
            Progress::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Auditable record of one rotation step
#[derive(Debug)]
pub struct RotationReport {
    /// Invocation id
    pub rotation_id: RotationId,
    /// Operation that ran
    pub operation: Operation,
    /// Identity it ran for
    pub identity: Identity,
    /// Key the operation acted on, once known
    pub access_key_id: Option<AccessKeyId>,
    /// Last applied step
    pub progress: Progress,
    /// When the operation started
    pub started_at: DateTime<Utc>,
    /// When the operation finished
    pub finished_at: Option<DateTime<Utc>>,
    /// Failure, if any
    pub error: Option<RotationError>,
}

impl RotationReport {
    pub(crate) fn begin(operation: Operation, identity: Identity) -> Self {
        Self {
            rotation_id: RotationId::new(),
            operation,
            identity,
            access_key_id: None,
            progress: Progress::NothingApplied,
            started_at: Utc::now(),
            finished_at: None,
            error: None,
        }
    }

    pub(crate) fn subject(&mut self, key_id: &AccessKeyId) {
        self.access_key_id = Some(key_id.clone());
    }

    pub(crate) fn advance(&mut self, progress: Progress) {
        debug_assert!(progress >= self.progress, "progress never moves backwards");
        self.progress = progress;
    }

    pub(crate) fn finish(&mut self, result: RotationResult<()>) {
        self.finished_at = Some(Utc::now());
        match result {
            Ok(()) => self.progress = Progress::Completed,
            Err(err) => self.error = Some(err),
        }
    }

    /// Coarse outcome for the caller
    pub fn outcome(&self) -> RotationOutcome {
        self.error
            .as_ref()
            .map_or(RotationOutcome::Completed, RotationError::outcome)
    }

    /// Failed after changing external state
    pub fn is_partial(&self) -> bool {
        self.error.is_some() && self.progress > Progress::NothingApplied
    }

    /// Wall-clock duration, once finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::AuthorityError;

    fn report() -> RotationReport {
        RotationReport::begin(Operation::Create, Identity::new("svc-app").unwrap())
    }

    #[test]
    fn success_completes() {
        let mut report = report();
        report.finish(Ok(()));
        assert_eq!(report.outcome(), RotationOutcome::Completed);
        assert_eq!(report.progress, Progress::Completed);
        assert!(!report.is_partial());
        assert!(report.duration().is_some());
    }

    #[test]
    fn failure_after_mutation_is_partial() {
        let mut report = report();
        report.advance(Progress::AuthorityMutated);
        report.finish(Err(RotationError::Authority(AuthorityError::Service {
            operation: "CreateAccessKey",
            message: "boom".into(),
        })));
        assert_eq!(report.outcome(), RotationOutcome::Failed);
        assert_eq!(report.progress, Progress::AuthorityMutated);
        assert!(report.is_partial());
    }

    #[test]
    fn failure_before_mutation_is_not_partial() {
        let mut report = report();
        report.finish(Err(RotationError::Authority(AuthorityError::NoSuchIdentity {
            identity: "svc-app".into(),
        })));
        assert!(!report.is_partial());
        assert_eq!(report.outcome().status_code(), 500);
    }
}
