//! HairNova history cache: console demo.
//!
//! Walks through the persistence pipeline the web shell relies on:
//! sanitizing, bounded saving, quota shrinking and defensive loading.
//! Set `RUST_LOG=debug` to watch the store's decisions on stderr.

use std::error::Error;

use serde_json::json;
use tracing_subscriber::EnvFilter;

use hairnova::managers::history_manager::{HistoryManager, HistoryManagerTrait, DEFAULT_MAX_VISIBLE};
use hairnova::services::history_store::{HistoryStore, HistoryStoreTrait, SaveOptions};
use hairnova::services::sanitizer::sanitize_record;
use hairnova::services::serializer::{serialize, SharedValue};
use hairnova::storage::{KeyValueStorage, MemoryStorage, SqliteStorage};
use hairnova::types::history::{encode_data_url, HistoryRecord, NewGeneration};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          HairNova history cache v{} — Demo Mode          ║", env!("CARGO_PKG_VERSION"));
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    demo_sanitizer();
    demo_serializer();
    demo_bounded_save()?;
    demo_quota_shrink();
    demo_defensive_load()?;
    demo_manager()?;

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("  ✅ History pipeline demonstrated successfully!");
    println!("═══════════════════════════════════════════════════════════════");
    Ok(())
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  📦 {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn generation(style: &str, color: Option<&str>) -> NewGeneration {
    NewGeneration {
        style_id: style.to_string(),
        style_name: style.replace('-', " "),
        color_id: color.map(str::to_string),
        result_image_url: format!("https://cdn.hairnova.app/results/{}.webp", style),
        original_image_url: Some("https://cdn.hairnova.app/uploads/selfie.jpg".to_string()),
        source_thumb: None,
        result_thumb: None,
    }
}

fn demo_sanitizer() {
    section("Sanitizer");

    let mut record = HistoryRecord::from_generation(generation("pixie-cut", Some("copper")), 1);
    record.result_image_url = encode_data_url("image/png", &[0u8; 90_000]);
    record.extra.insert("imageBase64".to_string(), json!("AAAA"));
    record.extra.insert("notes".to_string(), json!("n".repeat(60_000)));

    let clean = sanitize_record(&record);
    println!("  resultImageUrl kept: {} chars", clean.result_image_url.len());
    println!("  imageBase64 dropped: {}", !clean.extra.contains_key("imageBase64"));
    println!(
        "  notes truncated to: {} chars",
        clean.extra["notes"].as_str().map(|s| s.len()).unwrap_or(0)
    );
    println!("  ✓ Sanitizer OK");
    println!();
}

fn demo_serializer() {
    section("Cycle-safe serializer");

    let state = SharedValue::object();
    state.insert("styleId", SharedValue::String("bob".to_string()));
    state.insert("self", state.clone());
    println!("  {}", serialize(&state));
    // Break the cycle so the nodes are freed.
    state.insert("self", SharedValue::Null);
    println!("  ✓ Serializer OK");
    println!();
}

fn demo_bounded_save() -> Result<(), Box<dyn Error>> {
    section("Bounded save (SQLite medium)");

    let storage = SqliteStorage::open_in_memory(Some(5 * 1024 * 1024))?;
    let mut store = HistoryStore::new(storage);
    let records: Vec<HistoryRecord> = (0..15)
        .map(|i| HistoryRecord::from_generation(generation(&format!("style-{}", i), None), i))
        .collect();

    let outcome = store.save(&records);
    println!("  save(15 records) -> {:?}", outcome);
    println!("  load() -> {} records", store.load().len());
    println!("  ✓ Bounded save OK");
    println!();
    Ok(())
}

fn demo_quota_shrink() {
    section("Quota shrink (memory medium, 6 KB quota)");

    let mut store = HistoryStore::new(MemoryStorage::with_quota(6 * 1024));
    let records: Vec<HistoryRecord> = (0..10)
        .map(|i| {
            let mut r = HistoryRecord::from_generation(generation("long-layers", Some("ash")), i);
            r.result_thumb = Some("t".repeat(700));
            r
        })
        .collect();

    let outcome = store.save_with(&records, SaveOptions::default());
    println!("  save(10 × ~950 B) -> {:?}", outcome);
    println!("  ✓ Quota shrink OK");
    println!();
}

fn demo_defensive_load() -> Result<(), Box<dyn Error>> {
    section("Defensive load");

    let mut storage = MemoryStorage::new();
    for raw in ["{not valid json", "42"] {
        storage.set("hairnova_history", raw)?;
        let store = HistoryStore::new(storage.clone());
        println!("  stored {:<16} -> {} records", raw, store.load().len());
    }
    println!("  ✓ Defensive load OK");
    println!();
    Ok(())
}

fn demo_manager() -> Result<(), Box<dyn Error>> {
    section("History manager");

    let store = HistoryStore::new(MemoryStorage::new());
    let mut manager = HistoryManager::new(store, DEFAULT_MAX_VISIBLE);
    let first = manager.record_generation(generation("curtain-bangs", Some("honey")))?;
    manager.record_generation(generation("buzz-cut", None))?;
    manager.record_generation(generation("curtain-bangs", Some("honey")))?;
    println!("  3 generations, 1 duplicate -> {} records", manager.len());

    if manager.delete_record(&first.id).is_err() {
        println!("  first record was already replaced by its duplicate");
    }
    println!("  durable copy holds {} records", manager.store().load().len());
    println!("  ✓ History manager OK");
    println!();
    Ok(())
}
