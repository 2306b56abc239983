// HairNova Settings Engine
// Loads, saves, updates and resets the history settings.
// Settings are stored as a JSON file at the platform-specific config path.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::HistorySettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<HistorySettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &HistorySettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: HistorySettings,
}

impl SettingsEngine {
    /// Creates a SettingsEngine.
    ///
    /// `path_override` wins; otherwise `settings.json` in the platform
    /// config directory is used.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override.unwrap_or_else(|| {
            platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string()
        });

        Self {
            config_path,
            settings: HistorySettings::default(),
        }
    }

    /// Rejects settings the history store cannot work with.
    fn validate(settings: &HistorySettings) -> Result<(), SettingsError> {
        if settings.store.storage_key.is_empty() {
            return Err(SettingsError::InvalidValue(
                "store.storage_key cannot be empty".to_string(),
            ));
        }
        if settings.store.max_items == 0 {
            return Err(SettingsError::InvalidValue(
                "store.max_items must be at least 1".to_string(),
            ));
        }
        if settings.store.max_bytes == 0 {
            return Err(SettingsError::InvalidValue(
                "store.max_bytes must be at least 1".to_string(),
            ));
        }
        if settings.display.max_visible == 0 {
            return Err(SettingsError::InvalidValue(
                "display.max_visible must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Replaces the value at the dot-separated `key` inside `root`.
///
/// Only existing keys can be set, so typos are reported instead of being
/// silently ignored by deserialization.
fn set_path(root: &mut Value, key: &str, value: Value) -> Result<(), SettingsError> {
    let mut current = root;
    let mut parts = key.split('.').peekable();

    while let Some(part) = parts.next() {
        let map = current.as_object_mut().ok_or_else(|| {
            SettingsError::InvalidKey(format!(
                "Cannot navigate to key '{}': intermediate value is not an object",
                key
            ))
        })?;
        let slot = map
            .get_mut(part)
            .ok_or_else(|| SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)))?;

        if parts.peek().is_none() {
            *slot = value;
            return Ok(());
        }
        current = slot;
    }

    Err(SettingsError::InvalidKey("Key cannot be empty".to_string()))
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// A missing file yields defaults; a malformed one is an error.
    fn load(&mut self) -> Result<HistorySettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            self.settings = HistorySettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: HistorySettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        Self::validate(&settings)?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings, creating parent directories as needed.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &HistorySettings {
        &self.settings
    }

    /// Updates one setting by dot-notation key path and saves.
    ///
    /// # Examples
    /// - `"store.max_items"` → updates `settings.store.max_items`
    /// - `"storage.backend"` → updates `settings.storage.backend`
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;
        set_path(&mut json_value, key, value)?;

        let new_settings: HistorySettings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        Self::validate(&new_settings)?;

        self.settings = new_settings;
        self.save()
    }

    /// Resets all settings to defaults and saves to disk.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = HistorySettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
