//! Property-based tests for the record sanitizer.
//!
//! These tests verify that sanitizing is idempotent, that no dropped field
//! survives, and that every non keep-listed string ends up bounded, for
//! arbitrary records carrying arbitrary extra fields.

use hairnova::services::sanitizer::{
    sanitize, sanitize_record, DROP_FIELDS, IMAGE_PLACEHOLDER, MAX_FIELD_CHARS, TRUNCATION_MARKER,
};
use hairnova::types::history::HistoryRecord;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

/// Strategy for extra field names: a mix of drop-listed names and free ones.
fn arb_field_name() -> impl Strategy<Value = String> {
    prop_oneof![
        proptest::sample::select(DROP_FIELDS.to_vec()).prop_map(str::to_string),
        "[a-z][a-zA-Z]{0,12}",
    ]
}

/// Strategy for a string that may sit well above the size threshold.
/// Built from a repeated unit so large values stay cheap to generate.
fn arb_sized_string() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just(""), Just("data:image/png;base64,"), Just("note:")],
        prop_oneof![Just("a"), Just("é"), Just("🙂"), Just("a🙂"), Just("xyz")],
        prop_oneof![0usize..64, (MAX_FIELD_CHARS - 8)..(MAX_FIELD_CHARS + 8), 60_000usize..70_000],
    )
        .prop_map(|(prefix, unit, count)| format!("{}{}", prefix, unit.repeat(count)))
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        arb_sized_string().prop_map(Value::String),
        any::<i64>().prop_map(|n| json!(n)),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
        "[a-z]{0,8}".prop_map(|s| json!({ "nested": s })),
    ]
}

fn arb_record() -> impl Strategy<Value = HistoryRecord> {
    (
        "[a-z0-9-]{1,20}",
        any::<i64>(),
        "[a-z]{1,10}",
        proptest::option::of("[a-z]{1,8}"),
        proptest::collection::vec((arb_field_name(), arb_value()), 0..6),
    )
        .prop_map(|(id, created_at, style_id, color_id, fields)| HistoryRecord {
            id,
            created_at,
            result_image_url: format!("https://cdn.hairnova.app/r/{}.webp", style_id),
            style_name: style_id.to_uppercase(),
            style_id,
            color_id,
            extra: fields.into_iter().collect::<Map<String, Value>>(),
            ..Default::default()
        })
}

// **Property: sanitizing twice equals sanitizing once**
proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn sanitize_is_idempotent(records in proptest::collection::vec(arb_record(), 0..5)) {
        let once = sanitize(&records);
        let twice = sanitize(&once);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.len(), records.len());
    }

    #[test]
    fn sanitized_record_has_no_dropped_fields(record in arb_record()) {
        let clean = sanitize_record(&record);
        for name in DROP_FIELDS {
            prop_assert!(!clean.extra.contains_key(name), "field '{}' survived", name);
        }
    }

    #[test]
    fn sanitized_strings_are_bounded(record in arb_record()) {
        let clean = sanitize_record(&record);
        for (name, value) in &clean.extra {
            if let Value::String(s) = value {
                // One extra unit when a surrogate pair straddles the limit.
                let units = s.encode_utf16().count();
                prop_assert!(
                    units <= MAX_FIELD_CHARS + 1 + TRUNCATION_MARKER.len(),
                    "field '{}' kept {} UTF-16 units",
                    name,
                    units
                );
                if units > MAX_FIELD_CHARS {
                    prop_assert!(s.ends_with(TRUNCATION_MARKER));
                }
            }
        }
    }

    #[test]
    fn oversized_images_become_placeholders(count in (MAX_FIELD_CHARS + 1)..(MAX_FIELD_CHARS + 500)) {
        let mut record = HistoryRecord::default();
        let image = format!("data:image/jpeg;base64,{}", "A".repeat(count));
        record.extra.insert("preview".to_string(), Value::String(image));

        let clean = sanitize_record(&record);

        prop_assert_eq!(&clean.extra["preview"], &json!(IMAGE_PLACEHOLDER));
    }

    #[test]
    fn typed_fields_survive_unchanged(record in arb_record()) {
        let clean = sanitize_record(&record);
        prop_assert_eq!(&clean.id, &record.id);
        prop_assert_eq!(clean.created_at, record.created_at);
        prop_assert_eq!(&clean.style_id, &record.style_id);
        prop_assert_eq!(&clean.color_id, &record.color_id);
        prop_assert_eq!(&clean.result_image_url, &record.result_image_url);
    }
}
