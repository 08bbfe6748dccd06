//! Namespace slot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist one opaque JSON payload per store namespace.
//! - Track a per-namespace revision so other handles can detect writes.
//!
//! # Invariants
//! - `write_slots` is all-or-nothing across every namespace in the batch.
//! - Revisions start at 1 and increase by exactly 1 per write of a
//!   namespace. Counters live in `slot_revisions` and survive
//!   `delete_slot`, so a namespace never reuses a revision.

use crate::db::{DbError, SlotOp};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SLOT_SELECT_SQL: &str = "SELECT
    namespace,
    payload,
    schema_version,
    revision,
    updated_at
FROM store_slots";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for slot persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted slot data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persisted slot row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSlot {
    pub namespace: String,
    pub payload: String,
    pub schema_version: u32,
    pub revision: i64,
    pub updated_at_ms: i64,
}

/// Slot metadata without the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSummary {
    pub namespace: String,
    pub schema_version: u32,
    pub revision: i64,
    pub updated_at_ms: i64,
}

/// One namespace write of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotWrite<'a> {
    pub namespace: &'a str,
    pub payload: String,
    pub schema_version: u32,
}

/// Durable key-value slots keyed by namespace.
pub trait SlotRepository {
    fn read_slot(&self, namespace: &str) -> RepoResult<Option<StoredSlot>>;
    fn slot_revision(&self, namespace: &str) -> RepoResult<Option<i64>>;
    /// Writes every slot in one transaction; returns new revisions in order.
    fn write_slots(&self, writes: &[SlotWrite<'_>]) -> RepoResult<Vec<i64>>;
    /// Removes the slot; its revision counter is kept. Returns whether a
    /// slot existed.
    fn delete_slot(&self, namespace: &str) -> RepoResult<bool>;
    fn list_slots(&self) -> RepoResult<Vec<SlotSummary>>;
}

/// SQLite-backed slot repository over a borrowed connection.
pub struct SqliteSlotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SlotRepository for SqliteSlotRepository<'_> {
    fn read_slot(&self, namespace: &str) -> RepoResult<Option<StoredSlot>> {
        let slot_err = |op| DbError::slot(namespace, op);
        let mut stmt = self
            .conn
            .prepare(&format!("{SLOT_SELECT_SQL} WHERE namespace = ?1;"))
            .map_err(slot_err(SlotOp::Read))?;
        let mut rows = stmt.query([namespace]).map_err(slot_err(SlotOp::Read))?;
        if let Some(row) = rows.next().map_err(slot_err(SlotOp::Read))? {
            return Ok(Some(parse_slot_row(row)?));
        }
        Ok(None)
    }

    fn slot_revision(&self, namespace: &str) -> RepoResult<Option<i64>> {
        let revision = self
            .conn
            .query_row(
                "SELECT revision FROM store_slots WHERE namespace = ?1;",
                [namespace],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .map_err(DbError::slot(namespace, SlotOp::Read))?;
        Ok(revision)
    }

    fn write_slots(&self, writes: &[SlotWrite<'_>]) -> RepoResult<Vec<i64>> {
        // Dropping `tx` without commit rolls back every write of the batch.
        let tx = self.conn.unchecked_transaction()?;
        let mut revisions = Vec::with_capacity(writes.len());

        for write in writes {
            let revision = next_revision(&tx, write.namespace)
                .map_err(DbError::slot(write.namespace, SlotOp::Write))?;
            tx.execute(
                "INSERT INTO store_slots (namespace, payload, schema_version, revision, updated_at)
                 VALUES (?1, ?2, ?3, ?4, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(namespace) DO UPDATE SET
                    payload = excluded.payload,
                    schema_version = excluded.schema_version,
                    revision = excluded.revision,
                    updated_at = excluded.updated_at;",
                params![
                    write.namespace,
                    write.payload.as_str(),
                    write.schema_version,
                    revision
                ],
            )
            .map_err(DbError::slot(write.namespace, SlotOp::Write))?;
            revisions.push(revision);
        }

        tx.commit()?;
        Ok(revisions)
    }

    fn delete_slot(&self, namespace: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM store_slots WHERE namespace = ?1;", [namespace])
            .map_err(DbError::slot(namespace, SlotOp::Delete))?;
        if changed > 0 {
            info!("event=slot_delete module=repo status=ok namespace={namespace}");
        }
        Ok(changed > 0)
    }

    fn list_slots(&self) -> RepoResult<Vec<SlotSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SLOT_SELECT_SQL} ORDER BY namespace ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            let slot = parse_slot_row(row)?;
            summaries.push(SlotSummary {
                namespace: slot.namespace,
                schema_version: slot.schema_version,
                revision: slot.revision,
                updated_at_ms: slot.updated_at_ms,
            });
        }
        Ok(summaries)
    }
}

/// Bumps the namespace counter kept outside `store_slots`.
fn next_revision(conn: &Connection, namespace: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "INSERT INTO slot_revisions (namespace, revision) VALUES (?1, 1)
         ON CONFLICT(namespace) DO UPDATE SET revision = slot_revisions.revision + 1
         RETURNING revision;",
        [namespace],
        |row| row.get::<_, i64>(0),
    )
}

fn parse_slot_row(row: &Row<'_>) -> RepoResult<StoredSlot> {
    let namespace: String = row.get("namespace")?;
    let revision: i64 = row.get("revision")?;
    if revision < 1 {
        return Err(RepoError::InvalidData(format!(
            "invalid revision `{revision}` for namespace `{namespace}`"
        )));
    }
    let schema_version = match row.get::<_, i64>("schema_version")? {
        value if value >= 1 => u32::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!(
                "schema_version `{value}` out of range for namespace `{namespace}`"
            ))
        })?,
        value => {
            return Err(RepoError::InvalidData(format!(
                "invalid schema_version `{value}` for namespace `{namespace}`"
            )));
        }
    };

    Ok(StoredSlot {
        payload: row.get("payload")?,
        schema_version,
        revision,
        updated_at_ms: row.get("updated_at")?,
        namespace,
    })
}
