//! Unit tests for the failure-tolerant serializer.

use std::collections::BTreeMap;

use hairnova::services::serializer::{
    estimate_byte_size, serialize, serialize_shared, SharedValue, CIRCULAR_MARKER, EMPTY_OBJECT,
};
use hairnova::types::history::HistoryRecord;
use serde_json::{json, Value};

/// Drops every field of `node` so reference cycles built by a test are freed.
fn break_cycle(node: &SharedValue, keys: &[&str]) {
    for key in keys {
        node.insert(key, SharedValue::Null);
    }
}

#[test]
fn test_self_reference_becomes_marker() {
    let record = SharedValue::object();
    record.insert("id", SharedValue::String("bob-none-1".to_string()));
    record.insert("self", record.clone());

    let out = serialize(&record);
    let parsed: Value = serde_json::from_str(&out).unwrap();

    assert_eq!(parsed["id"], "bob-none-1");
    assert_eq!(parsed["self"], CIRCULAR_MARKER);
    break_cycle(&record, &["self"]);
}

#[test]
fn test_nested_back_reference_becomes_marker() {
    let record = SharedValue::object();
    let ui_node = SharedValue::object();
    ui_node.insert("owner", record.clone());
    record.insert("styleId", SharedValue::String("pixie".to_string()));
    record.insert("node", ui_node.clone());

    let parsed: Value = serde_json::from_str(&serialize(&record)).unwrap();

    assert_eq!(parsed["node"]["owner"], CIRCULAR_MARKER);
    break_cycle(&ui_node, &["owner"]);
}

#[test]
fn test_cycle_through_array_becomes_marker() {
    let list = SharedValue::array();
    list.push(SharedValue::Bool(true));
    list.push(list.clone());

    assert_eq!(serialize(&list), format!("[true,\"{}\"]", CIRCULAR_MARKER));

    if let SharedValue::Array(items) = &list {
        items.borrow_mut().clear();
    }
}

#[test]
fn test_shared_repeat_is_also_marked() {
    let thumb = SharedValue::from(json!({"w": 64, "h": 64}));
    let record = SharedValue::object();
    record.insert("sourceThumb", thumb.clone());
    record.insert("resultThumb", thumb);

    let parsed: Value = serde_json::from_str(&serialize(&record)).unwrap();

    assert_eq!(parsed["sourceThumb"], json!({"w": 64, "h": 64}));
    assert_eq!(parsed["resultThumb"], CIRCULAR_MARKER);
}

#[test]
fn test_node_shared_between_list_elements_is_marked_once() {
    let thumb = SharedValue::from(json!({"w": 64, "h": 64}));
    let first = SharedValue::object();
    first.insert("id", SharedValue::String("a".to_string()));
    first.insert("resultThumb", thumb.clone());
    let second = SharedValue::object();
    second.insert("id", SharedValue::String("b".to_string()));
    second.insert("resultThumb", thumb);

    let parsed: Value = serde_json::from_str(&serialize_shared(&[first, second])).unwrap();

    assert_eq!(parsed[0]["resultThumb"], json!({"w": 64, "h": 64}));
    assert_eq!(parsed[1]["id"], "b");
    assert_eq!(parsed[1]["resultThumb"], CIRCULAR_MARKER);
}

#[test]
fn test_element_pointing_back_at_an_earlier_element_is_marked() {
    let first = SharedValue::object();
    let second = SharedValue::object();
    second.insert("previous", first.clone());

    let out = serialize_shared(&[first.clone(), second]);

    assert_eq!(out, format!("[{{}},{{\"previous\":\"{}\"}}]", CIRCULAR_MARKER));
}

#[test]
fn test_serialize_shared_of_empty_list() {
    assert_eq!(serialize_shared(&[]), "[]");
}

#[test]
fn test_acyclic_shared_value_matches_serde_json() {
    let value = json!({"id": "a", "createdAt": 5, "tags": ["x", null, false], "n": 1.5});
    assert_eq!(
        serialize(&SharedValue::from(value.clone())),
        serde_json::to_string(&value).unwrap()
    );
}

#[test]
fn test_unserializable_value_falls_back_to_empty_object() {
    // JSON object keys must be strings.
    let mut map = BTreeMap::new();
    map.insert((1, 2), "pair-keyed");
    assert_eq!(serialize(&map), EMPTY_OBJECT);
}

#[test]
fn test_record_list_serializes_as_json_array() {
    let record: HistoryRecord = serde_json::from_value(json!({
        "id": "wolf-none-9",
        "createdAt": 9,
        "resultImageUrl": "https://r/9.webp",
        "styleId": "wolf",
        "styleName": "Wolf Cut"
    }))
    .unwrap();

    let out = serialize(&vec![record]);
    let parsed: Value = serde_json::from_str(&out).unwrap();

    assert!(parsed.is_array());
    assert_eq!(parsed[0]["styleName"], "Wolf Cut");
    assert!(parsed[0].get("colorId").is_none(), "absent options are not written as null");
}

#[test]
fn test_estimate_byte_size_is_utf8_length() {
    assert_eq!(estimate_byte_size(""), 0);
    assert_eq!(estimate_byte_size("[]"), 2);
    assert_eq!(estimate_byte_size("Balayage – Ombré"), "Balayage – Ombré".len());
    assert_eq!(estimate_byte_size("–"), 3);
}
