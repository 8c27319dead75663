//! Access keys as seen by the authority and by the secret store
//!
//! - [`IssuedCredential`]: freshly issued key pair, the only place the secret
//!   half exists outside the store
//! - [`KeySummary`]: list entry from the authority (id + status, no secret)
//! - [`SecretRecord`]: serialized envelope written to the secret store

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AccessKeyId, RecordError};

/// Authority-side status of an access key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyStatus {
    /// Key authenticates requests
    Active,
    /// Key exists but is rejected by the authority
    Inactive,
}

impl KeyStatus {
    /// Wire name used by the authority
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStatus::Active => "Active",
            KeyStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the authority's key listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySummary {
    /// Public key id
    pub id: AccessKeyId,
    /// Current status at the authority
    pub status: KeyStatus,
}

impl KeySummary {
    /// Convenience constructor
    pub fn new(id: AccessKeyId, status: KeyStatus) -> Self {
        Self { id, status }
    }
}

/// Key pair returned by the authority on issuance
///
/// `Debug` redacts the secret half.
#[derive(Clone)]
pub struct IssuedCredential {
    /// Public key id
    pub id: AccessKeyId,
    /// Secret half
    pub secret: SecretString,
}

impl IssuedCredential {
    /// Wraps a freshly issued key pair
    pub fn new(id: AccessKeyId, secret: impl Into<String>) -> Self {
        Self {
            id,
            secret: SecretString::from(secret.into()),
        }
    }
}

impl fmt::Debug for IssuedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCredential")
            .field("id", &self.id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Version stage label in the secret store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStage {
    /// Most recently written generation
    Current,
    /// Generation replaced by the most recent write
    Previous,
}

impl VersionStage {
    /// Staging label as used by AWS Secrets Manager
    pub fn aws_label(&self) -> &'static str {
        match self {
            VersionStage::Current => "AWSCURRENT",
            VersionStage::Previous => "AWSPREVIOUS",
        }
    }
}

impl fmt::Display for VersionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionStage::Current => f.write_str("current"),
            VersionStage::Previous => f.write_str("previous"),
        }
    }
}

/// Serialized key pair as stored in the secret store
///
/// Wire form is `{"AccessKey": "<id>", "SecretKey": "<secret>"}` so records
/// written by earlier rotation tooling stay readable.
#[derive(Clone)]
pub struct SecretRecord(SecretString);

#[derive(Serialize)]
struct RecordOut<'a> {
    #[serde(rename = "AccessKey")]
    access_key: &'a str,
    #[serde(rename = "SecretKey")]
    secret_key: &'a str,
}

#[derive(Deserialize)]
struct RecordIn {
    #[serde(rename = "AccessKey")]
    access_key: String,
}

impl SecretRecord {
    /// Serializes an issued key pair into a store payload
    pub fn seal(credential: &IssuedCredential) -> Result<Self, RecordError> {
        let out = RecordOut {
            access_key: credential.id.as_str(),
            secret_key: credential.secret.expose_secret(),
        };
        let json = serde_json::to_string(&out).map_err(RecordError::Encode)?;
        Ok(Self(SecretString::from(json)))
    }

    /// Wraps a payload read back from the store
    pub fn from_payload(payload: SecretString) -> Self {
        Self(payload)
    }

    /// Extracts the public key id without copying the secret half out
    pub fn access_key_id(&self) -> Result<AccessKeyId, RecordError> {
        let parsed: RecordIn =
            serde_json::from_str(self.0.expose_secret()).map_err(|e| RecordError::Decode {
                line: e.line(),
                column: e.column(),
            })?;
        AccessKeyId::new(parsed.access_key).map_err(RecordError::InvalidKeyId)
    }

    /// Raw payload for the store
    pub fn payload(&self) -> &SecretString {
        &self.0
    }
}

impl fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretRecord([REDACTED])")
    }
}
