use hrdesk_core::db::migrations::latest_version;
use hrdesk_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_object_exists(&conn, "table", "store_slots");
    assert_object_exists(&conn, "index", "idx_store_slots_updated_at");
    assert_object_exists(&conn, "table", "slot_revisions");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hrdesk.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_object_exists(&conn_second, "table", "store_slots");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn slot_table_rejects_invalid_revisions() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO store_slots (namespace, payload, schema_version, revision, updated_at)
         VALUES ('bad', '{}', 1, 0, 0);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn upgrade_seeds_revision_counters_from_existing_slots() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v2.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE store_slots (
            namespace TEXT PRIMARY KEY NOT NULL,
            payload TEXT NOT NULL,
            schema_version INTEGER NOT NULL CHECK (schema_version >= 1),
            revision INTEGER NOT NULL DEFAULT 1 CHECK (revision >= 1),
            created_at INTEGER NOT NULL DEFAULT 0,
            updated_at INTEGER NOT NULL DEFAULT 0
        );
        INSERT INTO store_slots (namespace, payload, schema_version, revision)
            VALUES ('payroll', '{}', 1, 7);
        PRAGMA user_version = 2;",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    let counter: i64 = conn
        .query_row(
            "SELECT revision FROM slot_revisions WHERE namespace = 'payroll';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(counter, 7);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_object_exists(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
