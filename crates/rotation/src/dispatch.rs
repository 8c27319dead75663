//! Request dispatch
//!
//! Turns an inbound `{"action", "username"}` request into one engine
//! operation and folds the report into a `{"status"}` response.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::core::{Identity, Operation, RotationOutcome};
use crate::rotation::{RotationEngine, RotationReport};

/// Requested action
///
/// Closed over the three operations; anything else is kept verbatim as
/// [`Action::Unrecognized`] so it can be logged and refused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    /// `"create"`
    Create,
    /// `"deactivate"`
    Deactivate,
    /// `"delete"`
    Delete,
    /// Any other value
    Unrecognized(String),
}

impl Action {
    /// Parse an action name; exact, case-sensitive match
    pub fn parse(name: &str) -> Self {
        match name {
            "create" => Action::Create,
            "deactivate" => Action::Deactivate,
            "delete" => Action::Delete,
            other => Action::Unrecognized(other.to_string()),
        }
    }

    /// Engine operation for this action, if it names one
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Action::Create => Some(Operation::Create),
            Action::Deactivate => Some(Operation::Deactivate),
            Action::Delete => Some(Operation::Delete),
            Action::Unrecognized(_) => None,
        }
    }

    /// Wire name
    pub fn as_str(&self) -> &str {
        match self {
            Action::Create => "create",
            Action::Deactivate => "deactivate",
            Action::Delete => "delete",
            Action::Unrecognized(name) => name,
        }
    }
}

impl From<String> for Action {
    fn from(name: String) -> Self {
        Action::parse(&name)
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.as_str().to_string()
    }
}

impl From<Operation> for Action {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::Create => Action::Create,
            Operation::Deactivate => Action::Deactivate,
            Operation::Delete => Action::Delete,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationRequest {
    /// What to do
    pub action: Action,
    /// Identity to do it for
    pub username: String,
}

impl RotationRequest {
    /// Build a request
    pub fn new(action: impl Into<Action>, username: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            username: username.into(),
        }
    }
}

/// Outbound response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationResponse {
    /// 200, 400 or 500
    pub status: u16,
}

impl From<RotationOutcome> for RotationResponse {
    fn from(outcome: RotationOutcome) -> Self {
        Self {
            status: outcome.status_code(),
        }
    }
}

/// Maps requests onto a [`RotationEngine`]
#[derive(Debug, Clone)]
pub struct Dispatcher {
    engine: RotationEngine,
}

impl Dispatcher {
    /// Wrap an engine
    pub fn new(engine: RotationEngine) -> Self {
        Self { engine }
    }

    /// Dispatch a request and return the full report
    ///
    /// `None` means the request was refused before the engine ran: the action
    /// is unrecognized or the username is not a valid identity.
    pub async fn dispatch_report(&self, request: &RotationRequest) -> Option<RotationReport> {
        // Both fields are unvalidated input, so they are logged escaped
        info!(action = ?request.action.as_str(), "Detected action");
        info!(username = ?request.username, "Detected username");

        let Some(operation) = request.action.operation() else {
            warn!(action = ?request.action.as_str(), "Unrecognized action, nothing dispatched");
            return None;
        };

        let identity = match Identity::new(request.username.as_str()) {
            Ok(identity) => identity,
            Err(err) => {
                warn!(error = ?err, "Rejected username, nothing dispatched");
                return None;
            }
        };

        Some(self.engine.run(operation, &identity).await)
    }

    /// Dispatch a request
    pub async fn dispatch(&self, request: &RotationRequest) -> RotationResponse {
        self.dispatch_report(request)
            .await
            .map_or(RotationOutcome::Failed, |report| report.outcome())
            .into()
    }

    /// Dispatch a raw JSON event; malformed events yield 500
    pub async fn handle_event(&self, event: serde_json::Value) -> RotationResponse {
        match serde_json::from_value::<RotationRequest>(event) {
            Ok(request) => self.dispatch(&request).await,
            Err(err) => {
                warn!(error = %err, "Malformed rotation request");
                RotationOutcome::Failed.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::create("create", Some(Operation::Create))]
    #[case::deactivate("deactivate", Some(Operation::Deactivate))]
    #[case::delete("delete", Some(Operation::Delete))]
    #[case::rotate("rotate", None)]
    #[case::case_sensitive("Create", None)]
    #[case::empty("", None)]
    fn parses_actions(#[case] name: &str, #[case] expected: Option<Operation>) {
        assert_eq!(Action::parse(name).operation(), expected);
    }

    #[test]
    fn unrecognized_keeps_original_text() {
        let action = Action::parse("rotate");
        assert_eq!(action, Action::Unrecognized("rotate".into()));
        assert_eq!(action.to_string(), "rotate");
    }

    #[test]
    fn request_round_trips_wire_shape() {
        let request: RotationRequest =
            serde_json::from_str(r#"{"action":"deactivate","username":"svc-app"}"#).unwrap();
        assert_eq!(request, RotationRequest::new(Operation::Deactivate, "svc-app"));

        let unknown: RotationRequest =
            serde_json::from_str(r#"{"action":"rotate","username":"svc-app"}"#).unwrap();
        assert_eq!(unknown.action.operation(), None);
    }

    #[test]
    fn response_wire_shape() {
        let response: RotationResponse = RotationOutcome::Inconsistent.into();
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            serde_json::json!({"status": 400})
        );
    }
}
