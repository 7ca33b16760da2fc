//! Identifier and validated scalar types for the update task domain.

use super::UpdateTaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a stored update task row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateTaskId(Uuid);

impl UpdateTaskId {
    /// Creates a new random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a task identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for UpdateTaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UpdateTaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque token shared by every ref update of one push.
///
/// The value is supplied by the environment that spawned the hook and is
/// never generated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Creates a validated correlation identifier.
    ///
    /// The value is kept exactly as given; surrounding whitespace is part of
    /// the token.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateTaskDomainError::EmptyCorrelationId`] when the value is
    /// empty or whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, UpdateTaskDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(UpdateTaskDomainError::EmptyCorrelationId);
        }
        Ok(Self(raw))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CorrelationId {
    type Error = UpdateTaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CorrelationId> for String {
    fn from(value: CorrelationId) -> Self {
        value.0
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully qualified git reference such as `refs/heads/main`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Creates a validated ref name.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateTaskDomainError::EmptyRefName`] when the value is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, UpdateTaskDomainError> {
        let raw = value.into();
        if raw.is_empty() {
            return Err(UpdateTaskDomainError::EmptyRefName);
        }
        Ok(Self(raw))
    }

    /// Returns the ref name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the short branch name when this ref lives under `refs/heads/`.
    #[must_use]
    pub fn branch_name(&self) -> Option<&str> {
        self.0.strip_prefix("refs/heads/")
    }

    /// Returns the short tag name when this ref lives under `refs/tags/`.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        self.0.strip_prefix("refs/tags/")
    }
}

impl TryFrom<String> for RefName {
    type Error = UpdateTaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RefName> for String {
    fn from(value: RefName) -> Self {
        value.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Git object identifier in lower-case hexadecimal form.
///
/// Both SHA-1 (40 characters) and SHA-256 (64 characters) repositories are
/// accepted. The all-zero id means the ref did not exist before the push or
/// was deleted by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

impl CommitId {
    const SHA1_HEX_LEN: usize = 40;
    const SHA256_HEX_LEN: usize = 64;

    /// Creates a validated commit identifier.
    ///
    /// Upper-case hex digits are normalized to lower case.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateTaskDomainError::InvalidCommitId`] when the value is
    /// not 40 or 64 hexadecimal characters.
    pub fn new(value: impl Into<String>) -> Result<Self, UpdateTaskDomainError> {
        let raw = value.into();
        let has_valid_length = raw.len() == Self::SHA1_HEX_LEN || raw.len() == Self::SHA256_HEX_LEN;
        if !has_valid_length || !raw.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(UpdateTaskDomainError::InvalidCommitId(raw));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// Returns the all-zero SHA-1 identifier.
    #[must_use]
    pub fn zero() -> Self {
        Self("0".repeat(Self::SHA1_HEX_LEN))
    }

    /// Returns `true` for the all-zero identifier.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.bytes().all(|byte| byte == b'0')
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitId {
    type Error = UpdateTaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommitId> for String {
    fn from(value: CommitId) -> Self {
        value.0
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
