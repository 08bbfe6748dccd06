use crate::model::record::{RecordId, ValidationError};
use crate::repo::slot_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store mutation and hydration errors.
///
/// A returned error always means the collection was left unchanged.
#[derive(Debug)]
pub enum StoreError {
    /// Namespace is blank or contains unsupported characters.
    InvalidNamespace(String),
    /// No record with this id.
    NotFound(RecordId),
    /// A record with this id already exists.
    DuplicateId(RecordId),
    /// Record or settings failed validation.
    Validation(ValidationError),
    /// Target status is not reachable from the current status.
    IllegalTransition {
        id: RecordId,
        from: &'static str,
        to: &'static str,
    },
    /// Status name matches no variant of the record's enumeration.
    UnknownStatus(String),
    /// Persisted slot could not be decoded into the current schema.
    CorruptSlot { namespace: String, message: String },
    /// In-memory state could not be encoded.
    Serialize(serde_json::Error),
    /// Slot persistence failed.
    Repo(RepoError),
    /// Cross-store operation between stores on different repositories.
    StorageMismatch,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNamespace(message) => write!(f, "invalid namespace: {message}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::DuplicateId(id) => write!(f, "record id already exists: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::IllegalTransition { id, from, to } => {
                write!(f, "record {id} cannot move from `{from}` to `{to}`")
            }
            Self::UnknownStatus(value) => write!(f, "unknown status `{value}`"),
            Self::CorruptSlot { namespace, message } => {
                write!(f, "slot `{namespace}` is unreadable: {message}")
            }
            Self::Serialize(err) => write!(f, "failed to encode slot: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::StorageMismatch => {
                write!(f, "stores must share one slot repository for this operation")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}
