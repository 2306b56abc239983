//! App Core for HairNova.
//!
//! Wires settings, the configured storage medium and the history manager
//! together, and owns their startup and shutdown sequence.

use std::path::Path;

use tracing::{info, warn};

use crate::managers::history_manager::{HistoryManager, HistoryManagerTrait};
use crate::services::history_store::HistoryStore;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::storage::{KeyValueStorage, MemoryStorage, SqliteStorage};
use crate::types::errors::{AppError, StorageError};
use crate::types::settings::{StorageBackend, StorageSettings};

/// Storage medium chosen at runtime from settings.
pub type DynStorage = Box<dyn KeyValueStorage + Send>;

/// Central application struct holding settings and the history.
pub struct App {
    pub settings_engine: SettingsEngine,
    pub history: HistoryManager<DynStorage>,
}

impl App {
    /// Creates the app, loading settings from `settings_path` (or the
    /// platform default) and placing the database under `data_dir`.
    ///
    /// A malformed settings file is logged and defaults are used without
    /// touching the file; a storage medium that cannot be opened is an error.
    pub fn new(settings_path: Option<String>, data_dir: &Path) -> Result<Self, AppError> {
        let mut settings_engine = SettingsEngine::new(settings_path);
        let settings = match settings_engine.load() {
            Ok(settings) => settings,
            Err(e) => {
                // Defaults stay in memory; the user's file is left for them to fix.
                warn!(path = settings_engine.get_config_path(), "Falling back to default settings: {}", e);
                settings_engine.get_settings().clone()
            }
        };

        let storage = Self::open_storage(&settings.storage, data_dir)?;
        let store = HistoryStore::with_settings(storage, &settings.store);
        let mut history = HistoryManager::new(store, settings.display.max_visible);
        history.set_autosave_enabled(settings.display.autosave);

        Ok(Self {
            settings_engine,
            history,
        })
    }

    /// Opens the storage medium named by `settings`.
    pub fn open_storage(settings: &StorageSettings, data_dir: &Path) -> Result<DynStorage, StorageError> {
        match settings.backend {
            StorageBackend::Sqlite => {
                let path = data_dir.join(&settings.database_file);
                info!(path = %path.display(), "Opening history database");
                Ok(Box::new(SqliteStorage::open(path, settings.quota_bytes)?))
            }
            StorageBackend::Memory => Ok(Box::new(match settings.quota_bytes {
                Some(quota) => MemoryStorage::with_quota(quota),
                None => MemoryStorage::new(),
            })),
        }
    }

    /// Re-applies store and display settings after a change.
    ///
    /// The storage backend itself is only chosen at startup.
    pub fn apply_settings(&mut self) {
        let settings = self.settings_engine.get_settings().clone();
        self.history.store_mut().configure(&settings.store);
        self.history.set_max_visible(settings.display.max_visible);
        self.history.set_autosave_enabled(settings.display.autosave);
    }

    /// Startup sequence: hydrate the history from the durable medium.
    pub fn startup(&mut self) {
        let loaded = self.history.hydrate();
        info!(records = loaded, "History hydrated");
    }

    /// Shutdown sequence: write any coalesced changes.
    pub fn shutdown(&mut self) {
        self.history.flush();
    }
}
