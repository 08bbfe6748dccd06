//! Shared record identity, metadata and validation contracts.
//!
//! # Invariants
//! - An empty `RecordId` means "not yet assigned"; stores never keep one.
//! - `apply_patch` never touches `RecordMeta` or status.

use super::status::Status;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("valid email regex"));

/// Opaque, store-unique record identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wraps a caller-provided id, trimming surrounding whitespace.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.len() == value.len() {
            Self(value)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Placeholder id for records the store should number itself.
    pub fn unassigned() -> Self {
        Self(String::new())
    }

    /// Generates a time-ordered id (UUID v7: epoch millis + random bits).
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn is_assigned(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Identity and bookkeeping timestamps shared by every record.
///
/// Timestamps are Unix epoch milliseconds; `0` means "unset" and is stamped
/// by the store on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub id: RecordId,
    #[serde(default)]
    pub created_at_ms: i64,
    #[serde(default)]
    pub updated_at_ms: i64,
}

impl RecordMeta {
    pub fn with_id(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is blank.
    MissingField(&'static str),
    /// Field holds a malformed email address.
    InvalidEmail(&'static str),
    /// Field value is outside its allowed range.
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field `{field}` is blank"),
            Self::InvalidEmail(field) => write!(f, "field `{field}` is not a valid email"),
            Self::InvalidValue { field, reason } => write!(f, "invalid `{field}`: {reason}"),
        }
    }
}

impl Error for ValidationError {}

/// One entity type managed by a [`crate::store::RecordStore`].
pub trait Record: Clone + Debug + Serialize + DeserializeOwned {
    /// Closed lifecycle enumeration for this entity.
    type Status: Status;
    /// Partial update; `None` fields are left untouched.
    type Patch;

    /// Stable kind name used in log events.
    const KIND: &'static str;

    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;
    fn status(&self) -> Self::Status;
    fn set_status(&mut self, status: Self::Status);
    fn validate(&self) -> Result<(), ValidationError>;
    fn apply_patch(&mut self, patch: Self::Patch);

    /// Hook run after a successful status change, before persistence.
    fn on_transition(&mut self, _from: Self::Status, _to: Self::Status, _at_ms: i64) {}

    fn id(&self) -> &RecordId {
        &self.meta().id
    }

    fn created_at_ms(&self) -> i64 {
        self.meta().created_at_ms
    }
}

/// Rejects blank text.
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Validates an email when present; blank is allowed.
pub fn check_optional_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || EMAIL_RE.is_match(trimmed) {
        return Ok(());
    }
    Err(ValidationError::InvalidEmail(field))
}

/// Replaces `target` when the patch carries a value.
pub(crate) fn merge<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}
