use organizer_core::db::migrations::latest_version;
use organizer_core::db::{open_db, open_db_in_memory, DbError};
use organizer_core::{KeyValueStore, SqliteKeyValueStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_entries");
}

#[test]
fn reopening_file_database_keeps_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("organizer.db");

    let conn = open_db(&path).unwrap();
    SqliteKeyValueStore::new(&conn).set("k", b"v1").unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let store = SqliteKeyValueStore::new(&conn);
    assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"v1"[..]));
}

#[test]
fn sqlite_store_upserts_removes_and_lists_keys() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteKeyValueStore::new(&conn);

    store.set("b", b"first").unwrap();
    store.set("b", b"second").unwrap();
    store.set("a", b"").unwrap();
    assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(store.get("b").unwrap().as_deref(), Some(&b"second"[..]));

    store.remove("b").unwrap();
    store.remove("missing").unwrap();
    assert_eq!(store.get("b").unwrap(), None);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
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

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
