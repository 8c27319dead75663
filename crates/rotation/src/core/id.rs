//! Identity and access-key identifiers
//!
//! Both are validated newtypes. Neither carries secret material, so both are
//! safe to log and to use as structured tracing fields.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Maximum length for identity names
const MAX_IDENTITY_LENGTH: usize = 128;

/// Maximum length for access-key ids
const MAX_KEY_ID_LENGTH: usize = 128;

/// Named principal whose access keys are rotated
///
/// Opaque: the only rules are non-empty, bounded length and no whitespace or
/// control characters, so the name can be used verbatim as a secret id and as
/// a log field.
///
/// # Examples
///
/// ```
/// use keyturn_rotation::Identity;
///
/// let identity = Identity::new("svc-app").unwrap();
/// assert_eq!(identity.as_str(), "svc-app");
///
/// assert!(Identity::new("").is_err());
/// assert!(Identity::new("svc app").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Creates a validated identity
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_token(&name, MAX_IDENTITY_LENGTH)
            .map_err(|reason| ValidationError::InvalidIdentity { name: name.clone(), reason })?;
        Ok(Self(name))
    }

    /// Returns the identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identity {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

/// Public half of an access key
///
/// Used as the lookup key at the authority and as the log subject for every
/// rotation step. The secret half never travels with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessKeyId(String);

impl AccessKeyId {
    /// Creates a validated access-key id
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        validate_token(&id, MAX_KEY_ID_LENGTH)
            .map_err(|reason| ValidationError::InvalidAccessKeyId { id: id.clone(), reason })?;
        Ok(Self(id))
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AccessKeyId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccessKeyId> for String {
    fn from(id: AccessKeyId) -> Self {
        id.0
    }
}

fn validate_token(value: &str, max_len: usize) -> Result<(), String> {
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    if value.len() > max_len {
        return Err(format!("exceeds maximum length of {max_len} characters"));
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("contains whitespace or control characters".to_string());
    }
    Ok(())
}
