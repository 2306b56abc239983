use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One completed style generation shown in the history panel.
///
/// Typed fields are the ones the UI renders from. Anything else the UI
/// attached to the record lands in `extra` and is subject to sanitization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub result_image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_thumb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_thumb: Option<String>,
    #[serde(default)]
    pub style_id: String,
    #[serde(default)]
    pub style_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Input for a freshly completed generation, before it has an id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGeneration {
    pub style_id: String,
    pub style_name: String,
    #[serde(default)]
    pub color_id: Option<String>,
    pub result_image_url: String,
    #[serde(default)]
    pub original_image_url: Option<String>,
    #[serde(default)]
    pub source_thumb: Option<String>,
    #[serde(default)]
    pub result_thumb: Option<String>,
}

impl HistoryRecord {
    /// Builds a record for `generation` completed at `created_at` (ms since epoch).
    ///
    /// The id is `{styleId}-{colorId}-{createdAt}`, with `none` standing in
    /// for a missing color.
    pub fn from_generation(generation: NewGeneration, created_at: i64) -> Self {
        let id = format!(
            "{}-{}-{}",
            generation.style_id,
            generation.color_id.as_deref().unwrap_or("none"),
            created_at
        );
        Self {
            id,
            created_at,
            result_image_url: generation.result_image_url,
            original_image_url: generation.original_image_url,
            source_thumb: generation.source_thumb,
            result_thumb: generation.result_thumb,
            style_id: generation.style_id,
            style_name: generation.style_name,
            color_id: generation.color_id,
            extra: Map::new(),
        }
    }

    /// Returns true when both records describe the same source image, style and color.
    pub fn same_generation(&self, other: &HistoryRecord) -> bool {
        self.original_image_url == other.original_image_url
            && self.style_id == other.style_id
            && self.color_id == other.color_id
    }
}

/// Returns the current UNIX timestamp in milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Builds a `data:` URL carrying `bytes` as base64.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}
