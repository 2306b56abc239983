//! SQLite-backed storage medium.
//!
//! Values live in the `kv_store` table. SQLite itself has no per-key
//! quota, so an optional byte budget is enforced the same way the memory
//! medium does it; a genuinely full disk (`SQLITE_FULL`) lands in the same
//! quota class.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, ErrorCode, OptionalExtension};

use super::KeyValueStorage;
use crate::database::Database;
use crate::types::errors::StorageError;

/// Key-value medium persisted in a SQLite database.
pub struct SqliteStorage {
    db: Database,
    quota_bytes: Option<usize>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P, quota_bytes: Option<usize>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Unavailable(format!(
                        "Failed to create data directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        let db = Database::open(path).map_err(classify)?;
        Ok(Self::from_database(db, quota_bytes))
    }

    pub fn open_in_memory(quota_bytes: Option<usize>) -> Result<Self, StorageError> {
        let db = Database::open_in_memory().map_err(classify)?;
        Ok(Self::from_database(db, quota_bytes))
    }

    pub fn from_database(db: Database, quota_bytes: Option<usize>) -> Self {
        Self { db, quota_bytes }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Bytes held by every key except `exclude`.
    fn used_bytes_excluding(&self, exclude: &str) -> Result<usize, StorageError> {
        let used: i64 = self
            .db
            .connection()
            .query_row(
                "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0) \
                 FROM kv_store WHERE key != ?1",
                params![exclude],
                |row| row.get(0),
            )
            .map_err(classify)?;
        Ok(used.max(0) as usize)
    }
}

/// Maps a SQLite failure onto the storage error taxonomy.
fn classify(e: rusqlite::Error) -> StorageError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _) => match err.code {
            ErrorCode::DiskFull => StorageError::QuotaExceeded(e.to_string()),
            ErrorCode::ReadOnly | ErrorCode::CannotOpen | ErrorCode::PermissionDenied => {
                StorageError::Unavailable(e.to_string())
            }
            _ => StorageError::DatabaseError(e.to_string()),
        },
        _ => StorageError::DatabaseError(e.to_string()),
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.db
            .connection()
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(classify)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota_bytes {
            let required = self.used_bytes_excluding(key)? + key.len() + value.len();
            if required > quota {
                return Err(StorageError::QuotaExceeded(format!(
                    "{} bytes required, quota is {}",
                    required, quota
                )));
            }
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        self.db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, now],
            )
            .map_err(classify)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.db
            .connection()
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map_err(classify)?;
        Ok(())
    }
}
