//! RPC method handler for the HairNova JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested directly.
//! `handle_method` maps a method name and its params onto the `App`.

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::history_manager::HistoryManagerTrait;
use crate::services::history_store::{HistoryStoreTrait, SaveOptions, SaveOutcome};
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::history::{HistoryRecord, NewGeneration};

/// Renders a save outcome for the UI.
pub fn outcome_to_json(outcome: &SaveOutcome) -> Value {
    match outcome {
        SaveOutcome::Saved {
            items,
            bytes,
            dropped,
            attempts,
        } => json!({
            "saved": true,
            "items": items,
            "bytes": bytes,
            "dropped": dropped,
            "attempts": attempts
        }),
        SaveOutcome::NothingFits => json!({"saved": false, "reason": "nothing_fits"}),
        SaveOutcome::AttemptsExhausted => json!({"saved": false, "reason": "attempts_exhausted"}),
        SaveOutcome::StorageFailed(msg) => {
            json!({"saved": false, "reason": "storage_failed", "message": msg})
        }
    }
}

fn records_to_json(records: &[HistoryRecord]) -> Result<Value, String> {
    serde_json::to_value(records).map_err(|e| e.to_string())
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── History (UI-owned list) ───
        "history.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            records_to_json(a.history.records())
        }
        "history.add" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            if let Some(record) = params.get("record") {
                let record: HistoryRecord =
                    serde_json::from_value(record.clone()).map_err(|e| format!("invalid record: {}", e))?;
                let id = record.id.clone();
                a.history.add_record(record).map_err(|e| e.to_string())?;
                Ok(json!({"id": id}))
            } else {
                let generation: NewGeneration = serde_json::from_value(params.clone())
                    .map_err(|e| format!("invalid generation: {}", e))?;
                let record = a.history.record_generation(generation).map_err(|e| e.to_string())?;
                serde_json::to_value(record).map_err(|e| e.to_string())
            }
        }
        "history.delete" => {
            let id = params.get("id").and_then(|v| v.as_str()).ok_or("missing id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.history.delete_record(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "history.clear" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.history.clear_all();
            Ok(json!({"ok": true}))
        }
        "history.flush" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            match a.history.flush() {
                Some(outcome) => Ok(outcome_to_json(&outcome)),
                None => Ok(json!({"saved": false, "reason": "clean"})),
            }
        }

        // ─── History (durable medium) ───
        // Writes `records` as the whole stored history, then reloads the
        // manager from it so later autosaves build on what was saved.
        // Unflushed changes in the manager are discarded.
        "history.save" => {
            let records = params.get("records").cloned().ok_or("missing records")?;
            let records: Vec<HistoryRecord> =
                serde_json::from_value(records).map_err(|e| format!("invalid records: {}", e))?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let store = a.history.store_mut();
            let defaults = store.default_options();
            let options = SaveOptions {
                max_items: params
                    .get("max_items")
                    .and_then(|v| v.as_u64())
                    .map(|n| n as usize)
                    .unwrap_or(defaults.max_items),
                max_bytes: params
                    .get("max_bytes")
                    .and_then(|v| v.as_u64())
                    .map(|n| n as usize)
                    .unwrap_or(defaults.max_bytes),
            };
            let outcome = store.save_with(&records, options);
            a.history.hydrate();
            Ok(outcome_to_json(&outcome))
        }
        "history.load" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            records_to_json(&a.history.store().load())
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            serde_json::to_value(a.settings_engine.get_settings()).map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = params.get("key").and_then(|v| v.as_str()).ok_or("missing key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            a.apply_settings();
            Ok(json!({"ok": true}))
        }

        // ─── Ping ───
        "ping" => Ok(json!({"pong": true})),

        _ => Err(format!("unknown method: {}", method)),
    }
}
