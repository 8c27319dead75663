//! Rotation operations and their coarse outcome

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three rotation transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Issue a new key and make it the store's current record
    Create,
    /// Mark the store's previous key inactive at the authority
    Deactivate,
    /// Remove the inactive key matching the store's previous record
    Delete,
}

impl Operation {
    /// Wire name of the operation
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Deactivate => "deactivate",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse status returned to the caller
///
/// `Inconsistent` is not a transient failure: it means the secret store and
/// the authority disagree and a human has to look before anything is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationOutcome {
    /// Transition completed (200)
    Completed,
    /// Store and authority disagree (400)
    Inconsistent,
    /// Any other failure (500)
    Failed,
}

impl RotationOutcome {
    /// Numeric status code carried on the wire
    pub fn status_code(&self) -> u16 {
        match self {
            RotationOutcome::Completed => 200,
            RotationOutcome::Inconsistent => 400,
            RotationOutcome::Failed => 500,
        }
    }
}

impl fmt::Display for RotationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_code())
    }
}
