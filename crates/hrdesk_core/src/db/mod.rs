//! SQLite bootstrap for the namespace slot tables.
//!
//! # Responsibility
//! - Open connections and bring `store_slots`/`slot_revisions` up to date.
//! - Attach the namespace and slot operation to SQLite failures.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - No slot is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Slot statement that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOp {
    Read,
    Write,
    Delete,
}

impl SlotOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Failure while touching one namespace slot.
    Slot {
        namespace: String,
        op: SlotOp,
        source: rusqlite::Error,
    },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Wraps a SQLite error with the slot it was raised for.
    pub fn slot(namespace: &str, op: SlotOp) -> impl FnOnce(rusqlite::Error) -> Self + '_ {
        move |source| Self::Slot {
            namespace: namespace.to_string(),
            op,
            source,
        }
    }

    /// Namespace of a slot failure, if any.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Slot { namespace, .. } => Some(namespace),
            Self::Sqlite(_) | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Slot {
                namespace,
                op,
                source,
            } => write!(f, "slot {} failed for `{namespace}`: {source}", op.as_str()),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "slot database schema {db_version} is newer than this build ({latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Slot { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
