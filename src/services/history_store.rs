//! History Store for HairNova.
//!
//! Persists the newest-first generation history under a single key of a
//! size-limited [`KeyValueStorage`]. The store is a convenience cache, not a
//! source of truth: `save`, `load` and `clear` never return an error. Every
//! failure degrades to "fewer or no records stored" and is reported through
//! `tracing` warnings.

use serde_json::Value;
use tracing::{debug, warn};

use crate::services::sanitizer::sanitize_record;
use crate::services::serializer::{estimate_byte_size, serialize};
use crate::storage::KeyValueStorage;
use crate::types::errors::StorageError;
use crate::types::history::HistoryRecord;
use crate::types::settings::StoreSettings;

pub const DEFAULT_STORAGE_KEY: &str = "hairnova_history";
pub const DEFAULT_MAX_ITEMS: usize = 10;
pub const DEFAULT_MAX_BYTES: usize = 2_500_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Per-call bounds for [`HistoryStoreTrait::save_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    pub max_items: usize,
    pub max_bytes: usize,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// What a save ended up doing. Informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// `items` records were written as `bytes` bytes; `dropped` bounded-out
    /// records were left behind to make them fit.
    Saved {
        items: usize,
        bytes: usize,
        dropped: usize,
        attempts: u32,
    },
    /// Shrinking emptied the candidate list before anything fit.
    NothingFits,
    /// Every attempt was over budget or rejected for quota.
    AttemptsExhausted,
    /// The medium failed for a reason other than capacity.
    StorageFailed(String),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

/// Trait defining history persistence operations.
pub trait HistoryStoreTrait {
    fn save(&mut self, records: &[HistoryRecord]) -> SaveOutcome;
    fn save_with(&mut self, records: &[HistoryRecord], options: SaveOptions) -> SaveOutcome;
    fn load(&self) -> Vec<HistoryRecord>;
    fn clear(&mut self);
}

/// Bounded history cache over a key-value medium.
pub struct HistoryStore<S: KeyValueStorage> {
    storage: S,
    key: String,
    defaults: SaveOptions,
    max_attempts: u32,
}

impl<S: KeyValueStorage> HistoryStore<S> {
    /// Creates a store using the default key and bounds.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            key: DEFAULT_STORAGE_KEY.to_string(),
            defaults: SaveOptions::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Creates a store configured from the `store` settings section.
    pub fn with_settings(storage: S, settings: &StoreSettings) -> Self {
        Self {
            storage,
            key: settings.storage_key.clone(),
            defaults: SaveOptions {
                max_items: settings.max_items,
                max_bytes: settings.max_bytes,
            },
            max_attempts: settings.max_attempts.max(1),
        }
    }

    /// Applies new key and bounds to subsequent calls.
    pub fn configure(&mut self, settings: &StoreSettings) {
        self.key = settings.storage_key.clone();
        self.defaults = SaveOptions {
            max_items: settings.max_items,
            max_bytes: settings.max_bytes,
        };
        self.max_attempts = settings.max_attempts.max(1);
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_options(&self) -> SaveOptions {
        self.defaults
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Writes `payload`, clearing the key and retrying once on a quota error.
    fn write(&mut self, payload: &str) -> Result<(), StorageError> {
        match self.storage.set(&self.key, payload) {
            Err(e) if e.is_quota_exceeded() => {
                warn!(key = %self.key, "{}; clearing stored history and retrying", e);
                if let Err(remove_err) = self.storage.remove(&self.key) {
                    warn!(key = %self.key, "Failed to clear stored history: {}", remove_err);
                }
                self.storage.set(&self.key, payload)
            }
            other => other,
        }
    }
}

impl<S: KeyValueStorage> HistoryStoreTrait for HistoryStore<S> {
    fn save(&mut self, records: &[HistoryRecord]) -> SaveOutcome {
        let options = self.defaults;
        self.save_with(records, options)
    }

    /// Sanitizes, bounds and writes `records`, shrinking the tail on failure.
    ///
    /// Each attempt serializes the current candidate list. If it fits in
    /// `max_bytes` it is written; a quota rejection that survives one
    /// clear-and-retry, or an over-budget payload, drops the last 20% of the
    /// candidates (at least one) and tries again.
    fn save_with(&mut self, records: &[HistoryRecord], options: SaveOptions) -> SaveOutcome {
        let mut candidates: Vec<HistoryRecord> = records
            .iter()
            .map(sanitize_record)
            .take(options.max_items)
            .collect();
        let wanted = candidates.len();

        for attempt in 1..=self.max_attempts {
            let payload = serialize(&candidates);
            let bytes = estimate_byte_size(&payload);

            if bytes <= options.max_bytes {
                match self.write(&payload) {
                    Ok(()) => {
                        debug!(
                            key = %self.key,
                            items = candidates.len(),
                            bytes,
                            attempt,
                            "History saved"
                        );
                        return SaveOutcome::Saved {
                            items: candidates.len(),
                            bytes,
                            dropped: records.len() - candidates.len(),
                            attempts: attempt,
                        };
                    }
                    Err(e) if e.is_quota_exceeded() => {
                        warn!(key = %self.key, attempt, "History still over quota: {}", e);
                    }
                    Err(e) => {
                        warn!(key = %self.key, "History not saved, storage failed: {}", e);
                        return SaveOutcome::StorageFailed(e.to_string());
                    }
                }
            } else {
                debug!(bytes, max_bytes = options.max_bytes, attempt, "History over byte budget");
            }

            // TODO: evict the largest record first; a huge data-URL near the
            // front survives several rounds of tail cuts.
            let remove = (candidates.len() / 5).max(1);
            candidates.truncate(candidates.len().saturating_sub(remove));
            if candidates.is_empty() {
                warn!(key = %self.key, wanted, "History not saved, no record fits the budget");
                return SaveOutcome::NothingFits;
            }
        }

        warn!(
            key = %self.key,
            attempts = self.max_attempts,
            wanted,
            "History not saved, attempts exhausted"
        );
        SaveOutcome::AttemptsExhausted
    }

    /// Reads the stored history. Absent, unreadable or malformed data yields
    /// an empty list; array elements that are not records are skipped.
    fn load(&self) -> Vec<HistoryRecord> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, "Failed to read stored history: {}", e);
                return Vec::new();
            }
        };

        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %self.key, "Stored history is not valid JSON: {}", e);
                return Vec::new();
            }
        };

        let Value::Array(items) = parsed else {
            warn!(key = %self.key, "Stored history is not an array");
            return Vec::new();
        };

        items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(key = %self.key, index, "Skipping unreadable history record: {}", e);
                    None
                }
            })
            .collect()
    }

    fn clear(&mut self) {
        if let Err(e) = self.storage.remove(&self.key) {
            warn!(key = %self.key, "Failed to clear stored history: {}", e);
        }
    }
}
