use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single suggested show, as produced by the language model and then
/// enriched by verification. Never persisted.
///
/// Model output is loosely shaped, so the item keeps the model's JSON object
/// as-is. Enrichment only ever writes `verified`, `info_url`,
/// `verified_description` and `verified_image_url`; every other key is
/// written back exactly as the model supplied it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RecommendationItem(Map<String, Value>);

impl RecommendationItem {
    pub fn titled(title: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("title".to_string(), Value::String(title.into()));
        Self(fields)
    }

    /// Trimmed title, if the model supplied a usable one
    ///
    /// Only string titles count; anything else is treated as missing.
    pub fn lookup_title(&self) -> Option<&str> {
        self.0
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn info_url(&self) -> Option<&str> {
        self.0.get("info_url").and_then(Value::as_str)
    }

    pub fn set_verified(&mut self, verified: bool) {
        self.0.insert("verified".to_string(), Value::Bool(verified));
    }

    pub fn set_info_url(&mut self, url: String) {
        self.0.insert("info_url".to_string(), Value::String(url));
    }

    pub fn set_verified_description(&mut self, description: String) {
        self.0
            .insert("verified_description".to_string(), Value::String(description));
    }

    pub fn set_verified_image_url(&mut self, url: String) {
        self.0
            .insert("verified_image_url".to_string(), Value::String(url));
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for RecommendationItem {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Outcome of a successful fan-site lookup. Consumed once by enrichment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    pub title: String,
    pub found: bool,
    pub source: String,
    pub search_url: String,
    pub article_url: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
}
