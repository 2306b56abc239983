//! Unit tests for the HairNova database layer (connection + migrations).

use hairnova::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use hairnova::database::Database;
use tempfile::TempDir;

#[test]
fn test_open_in_memory_succeeds() {
    assert!(Database::open_in_memory().is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_kv_store() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let exists: bool = db
        .connection()
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='kv_store'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(exists, "kv_store should exist after migrations");
}

#[test]
fn test_schema_version_recorded() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().unwrap();
    run_all(db.connection()).expect("second run should be a no-op");
    run_all(db.connection()).expect("third run should be a no-op");

    let rows: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, CURRENT_SCHEMA_VERSION as i64);
}

#[test]
fn test_file_database_persists_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.db");

    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES ('k', 'v', 0)",
                [],
            )
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let value: String = db
        .connection()
        .query_row("SELECT value FROM kv_store WHERE key = 'k'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(value, "v");
}
