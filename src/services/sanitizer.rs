//! Projection of history records down to what is safe to persist.
//!
//! Fields the UI renders from are kept verbatim, known binary payload
//! fields are dropped, and any other oversized string is cut down.
//! Sanitizing is pure: running it twice gives the same result as once.

use serde_json::{Map, Value};

use crate::types::history::HistoryRecord;

/// Fields passed through untouched, whatever their size.
pub const KEEP_FIELDS: [&str; 9] = [
    "resultImageUrl",
    "originalImageUrl",
    "sourceThumb",
    "resultThumb",
    "styleId",
    "styleName",
    "colorId",
    "id",
    "createdAt",
];

/// Fields always removed. Matched by exact name.
pub const DROP_FIELDS: [&str; 13] = [
    "image",
    "imageBase64",
    "base64",
    "dataUrl",
    "dataURL",
    "previewBase64",
    "resultBase64",
    "originalBase64",
    "maskBase64",
    "blob",
    "file",
    "rawImage",
    "fullImage",
];

/// Longest string stored as-is in a non keep-listed field, measured in
/// UTF-16 code units the way the web UI measures string length.
pub const MAX_FIELD_CHARS: usize = 50_000;

/// Replaces an oversized embedded image.
pub const IMAGE_PLACEHOLDER: &str = "data:image/placeholder";

/// Appended to truncated strings.
pub const TRUNCATION_MARKER: &str = "...";

/// Sanitizes every record independently, preserving order.
pub fn sanitize(records: &[HistoryRecord]) -> Vec<HistoryRecord> {
    records.iter().map(sanitize_record).collect()
}

/// Sanitizes a single record.
///
/// Typed fields are all keep-listed, so only `extra` is rewritten.
pub fn sanitize_record(record: &HistoryRecord) -> HistoryRecord {
    let extra: Map<String, Value> = record
        .extra
        .iter()
        .filter_map(|(name, value)| sanitize_field(name, value).map(|v| (name.clone(), v)))
        .collect();

    HistoryRecord {
        extra,
        ..record.clone()
    }
}

/// Returns the value to persist for field `name`, or `None` to drop it.
pub fn sanitize_field(name: &str, value: &Value) -> Option<Value> {
    if KEEP_FIELDS.contains(&name) {
        return Some(value.clone());
    }
    if DROP_FIELDS.contains(&name) {
        return None;
    }
    match value {
        Value::String(s) => Some(Value::String(shrink_string(s))),
        // No recursion into nested objects or arrays.
        other => Some(other.clone()),
    }
}

fn shrink_string(s: &str) -> String {
    if s.encode_utf16().count() <= MAX_FIELD_CHARS {
        return s.to_string();
    }
    if s.starts_with("data:image") {
        return IMAGE_PLACEHOLDER.to_string();
    }
    format!("{}{}", &s[..utf16_cut(s, MAX_FIELD_CHARS)], TRUNCATION_MARKER)
}

/// Byte offset after the first `limit` UTF-16 code units of `s`.
///
/// A surrogate pair straddling the limit is kept whole, so cutting an
/// already cut string lands on the same offset.
fn utf16_cut(s: &str, limit: usize) -> usize {
    let mut units = 0;
    for (index, c) in s.char_indices() {
        if units >= limit {
            return index;
        }
        units += c.len_utf16();
    }
    s.len()
}
