use serde::{Deserialize, Serialize};

/// Top-level settings container.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HistorySettings {
    pub store: StoreSettings,
    pub display: DisplaySettings,
    pub storage: StorageSettings,
}

/// Bounds applied by the history store on every save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreSettings {
    pub storage_key: String,
    pub max_items: usize,
    pub max_bytes: usize,
    pub max_attempts: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            storage_key: "hairnova_history".to_string(),
            max_items: 10,
            max_bytes: 2_500_000,
            max_attempts: 5,
        }
    }
}

/// How the in-memory history behaves for the UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplaySettings {
    pub max_visible: usize,
    pub autosave: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            max_visible: 12,
            autosave: true,
        }
    }
}

/// Which key-value medium backs the history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub database_file: String,
    pub quota_bytes: Option<usize>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            database_file: "history.db".to_string(),
            // Same budget browsers give localStorage per origin.
            quota_bytes: Some(5 * 1024 * 1024),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}
