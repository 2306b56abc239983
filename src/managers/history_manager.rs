//! History Manager for HairNova.
//!
//! Implements `HistoryManagerTrait`: the canonical, newest-first list of
//! generations the history panel shows. It owns ordering, de-duplication,
//! the display cap and deletion; the durable copy is delegated to a
//! [`HistoryStore`] after every change.

use crate::services::history_store::{HistoryStore, HistoryStoreTrait, SaveOutcome};
use crate::storage::KeyValueStorage;
use crate::types::errors::HistoryError;
use crate::types::history::{now_millis, HistoryRecord, NewGeneration};

/// Default number of records kept in memory for display.
pub const DEFAULT_MAX_VISIBLE: usize = 12;

/// Trait defining generation history operations.
pub trait HistoryManagerTrait {
    fn hydrate(&mut self) -> usize;
    fn record_generation(&mut self, generation: NewGeneration) -> Result<HistoryRecord, HistoryError>;
    fn add_record(&mut self, record: HistoryRecord) -> Result<(), HistoryError>;
    fn delete_record(&mut self, id: &str) -> Result<(), HistoryError>;
    fn clear_all(&mut self);
    fn records(&self) -> &[HistoryRecord];
    fn flush(&mut self) -> Option<SaveOutcome>;
    fn is_autosave_enabled(&self) -> bool;
    fn set_autosave_enabled(&mut self, enabled: bool);
}

/// In-memory generation history persisted through a [`HistoryStore`].
pub struct HistoryManager<S: KeyValueStorage> {
    store: HistoryStore<S>,
    records: Vec<HistoryRecord>,
    max_visible: usize,
    autosave: bool,
    dirty: bool,
}

impl<S: KeyValueStorage> HistoryManager<S> {
    /// Creates an empty manager. Call [`HistoryManagerTrait::hydrate`] to
    /// pick up what a previous run stored.
    pub fn new(store: HistoryStore<S>, max_visible: usize) -> Self {
        Self {
            store,
            records: Vec::new(),
            max_visible: max_visible.max(1),
            autosave: true,
            dirty: false,
        }
    }

    pub fn store(&self) -> &HistoryStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut HistoryStore<S> {
        &mut self.store
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Changes the display cap, dropping the oldest records beyond it.
    pub fn set_max_visible(&mut self, max_visible: usize) {
        self.max_visible = max_visible.max(1);
        if self.records.len() > self.max_visible {
            self.records.truncate(self.max_visible);
            self.changed();
        }
    }

    /// Returns true when changes are waiting for [`HistoryManagerTrait::flush`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Inserts `record` at the front, replacing any record of the same
    /// generation, then enforces the display cap.
    fn insert_front(&mut self, record: HistoryRecord) {
        self.records.retain(|existing| !existing.same_generation(&record));
        self.records.insert(0, record);
        self.records.truncate(self.max_visible);
    }

    /// Persists now when autosave is on, otherwise marks the list dirty.
    fn changed(&mut self) {
        self.dirty = true;
        if self.autosave {
            self.flush();
        }
    }
}

impl<S: KeyValueStorage> HistoryManagerTrait for HistoryManager<S> {
    /// Replaces the in-memory list with the stored one. Returns the count loaded.
    fn hydrate(&mut self) -> usize {
        let mut loaded = self.store.load();
        loaded.truncate(self.max_visible);
        self.records = loaded;
        self.dirty = false;
        self.records.len()
    }

    /// Records a completed generation and returns the stored record.
    fn record_generation(&mut self, generation: NewGeneration) -> Result<HistoryRecord, HistoryError> {
        if generation.style_id.is_empty() {
            return Err(HistoryError::InvalidRecord("style id is empty".to_string()));
        }
        if generation.result_image_url.is_empty() {
            return Err(HistoryError::InvalidRecord("result image is empty".to_string()));
        }

        let record = HistoryRecord::from_generation(generation, now_millis());
        self.insert_front(record.clone());
        self.changed();
        Ok(record)
    }

    /// Adds an already assembled record (e.g. handed over by the UI).
    fn add_record(&mut self, record: HistoryRecord) -> Result<(), HistoryError> {
        if record.id.is_empty() {
            return Err(HistoryError::InvalidRecord("id is empty".to_string()));
        }
        self.insert_front(record);
        self.changed();
        Ok(())
    }

    fn delete_record(&mut self, id: &str) -> Result<(), HistoryError> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return Err(HistoryError::NotFound(id.to_string()));
        }
        self.changed();
        Ok(())
    }

    /// Empties the history and removes the stored copy right away.
    fn clear_all(&mut self) {
        self.records.clear();
        self.store.clear();
        self.dirty = false;
    }

    fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Writes pending changes. Returns `None` when there was nothing to write.
    fn flush(&mut self) -> Option<SaveOutcome> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.store.save(&self.records))
    }

    fn is_autosave_enabled(&self) -> bool {
        self.autosave
    }

    /// With autosave off, rapid changes are coalesced into the next `flush`.
    fn set_autosave_enabled(&mut self, enabled: bool) {
        self.autosave = enabled;
        if enabled {
            self.flush();
        }
    }
}
