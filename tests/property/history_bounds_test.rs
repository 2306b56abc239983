//! Property-based tests for the bounds the history store enforces.
//!
//! These tests verify that whatever list is saved, the stored history never
//! exceeds the item or byte budget, is an order-preserving prefix of the
//! sanitized input, and that saving terminates without panicking even on
//! a medium whose quota is smaller than the budget.

use hairnova::services::history_store::{
    HistoryStore, HistoryStoreTrait, SaveOptions, SaveOutcome, DEFAULT_STORAGE_KEY,
};
use hairnova::services::sanitizer::sanitize;
use hairnova::storage::{KeyValueStorage, MemoryStorage};
use hairnova::types::history::{HistoryRecord, NewGeneration};
use proptest::prelude::*;

/// Strategy for a record whose thumbnail size varies from none to a few KB.
fn arb_record() -> impl Strategy<Value = HistoryRecord> {
    (
        "[a-z]{1,12}",
        proptest::option::of("[a-z]{1,6}"),
        0i64..2_000_000_000_000,
        proptest::option::of(0usize..4_000),
    )
        .prop_map(|(style, color, created_at, thumb)| {
            HistoryRecord::from_generation(
                NewGeneration {
                    style_name: style.to_uppercase(),
                    result_image_url: format!("https://cdn.hairnova.app/r/{}.webp", style),
                    style_id: style,
                    color_id: color,
                    original_image_url: None,
                    source_thumb: None,
                    result_thumb: thumb.map(|n| "t".repeat(n)),
                },
                created_at,
            )
        })
}

fn arb_records() -> impl Strategy<Value = Vec<HistoryRecord>> {
    proptest::collection::vec(arb_record(), 0..30)
}

fn arb_options() -> impl Strategy<Value = SaveOptions> {
    (1usize..15, 100usize..20_000).prop_map(|(max_items, max_bytes)| SaveOptions {
        max_items,
        max_bytes,
    })
}

// **Property: stored history stays within both budgets**
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn saved_history_respects_item_and_byte_budget(
        records in arb_records(),
        options in arb_options(),
    ) {
        let mut store = HistoryStore::new(MemoryStorage::new());
        let outcome = store.save_with(&records, options);

        let loaded = store.load();
        prop_assert!(loaded.len() <= options.max_items);

        match outcome {
            SaveOutcome::Saved { items, bytes, .. } => {
                let raw = store.storage().get(DEFAULT_STORAGE_KEY).unwrap().unwrap_or_default();
                prop_assert!(bytes <= options.max_bytes);
                prop_assert_eq!(raw.len(), bytes);
                prop_assert_eq!(items, loaded.len());
            }
            _ => prop_assert!(loaded.is_empty(), "a failed save must not leave data behind"),
        }
    }

    #[test]
    fn saved_history_is_a_prefix_of_the_input(
        records in arb_records(),
        options in arb_options(),
    ) {
        let mut store = HistoryStore::new(MemoryStorage::new());
        store.save_with(&records, options);

        let loaded = store.load();
        let expected = sanitize(&records);
        prop_assert_eq!(&loaded[..], &expected[..loaded.len()]);
    }

    #[test]
    fn save_terminates_on_a_tight_quota(
        records in arb_records(),
        quota in 0usize..6_000,
    ) {
        let mut store = HistoryStore::new(MemoryStorage::with_quota(quota));
        let outcome = store.save(&records);

        prop_assert!(store.storage().used_bytes() <= quota);
        if !outcome.is_saved() {
            prop_assert!(store.load().is_empty());
        }
    }
}
