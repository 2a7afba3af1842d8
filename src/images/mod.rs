//! Image reference normalization for product listings.
//!
//! Clients send image lists in whatever shape they have at hand: a JSON
//! array, a JSON-encoded string, a comma-joined string or a single path.
//! [`ImageUrlNormalizer::normalize`] turns any of those into an ordered list
//! of absolute URLs and never fails; entries it cannot use are dropped with a
//! log line.

use serde_json::Value;

use crate::config::ImagesConfig;

#[derive(Debug, Clone)]
pub struct ImageUrlNormalizer {
    base_url: String,
    blocklist: Vec<String>,
}

impl ImageUrlNormalizer {
    pub fn new(config: &ImagesConfig) -> Self {
        Self::with_base_url(config.base_url.clone(), config.blocklist.clone())
    }

    pub fn with_base_url(base_url: impl Into<String>, blocklist: Vec<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, blocklist }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Normalize a field that may be absent from the source document
    pub fn normalize_field(&self, raw: Option<&Value>) -> Vec<String> {
        match raw {
            Some(value) => self.normalize(value),
            None => Vec::new(),
        }
    }

    pub fn normalize(&self, raw: &Value) -> Vec<String> {
        candidates(raw)
            .into_iter()
            .filter_map(|candidate| self.resolve(candidate.trim()))
            .collect()
    }

    fn resolve(&self, candidate: &str) -> Option<String> {
        if candidate.is_empty() {
            return None;
        }

        if let Some(pattern) = self.blocklist.iter().find(|p| candidate.contains(p.as_str())) {
            tracing::warn!(url = %candidate, pattern = %pattern, "Skipping blocklisted image URL");
            return None;
        }

        if candidate.starts_with("http://") || candidate.starts_with("https://") {
            Some(candidate.to_string())
        } else if candidate.starts_with("/uploads/") {
            Some(format!("{}{}", self.base_url, candidate))
        } else if candidate.starts_with("uploads/") {
            Some(format!("{}/{}", self.base_url, candidate))
        } else {
            tracing::warn!(url = %candidate, "Skipping invalid image URL format");
            None
        }
    }
}

/// Coerce the raw field into candidate strings, dropping non-string entries
fn candidates(raw: &Value) -> Vec<String> {
    match raw {
        Value::Array(items) => strings_of(items),
        Value::String(text) => candidates_from_text(text),
        Value::Null => Vec::new(),
        other => {
            tracing::debug!(kind = %json_kind(other), "Image list is not a list or string, ignoring");
            Vec::new()
        }
    }
}

fn candidates_from_text(text: &str) -> Vec<String> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) {
        return strings_of(&items);
    }

    let pieces: Vec<String> = text
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect();

    if pieces.is_empty() && !text.trim().is_empty() {
        vec![text.to_string()]
    } else {
        pieces
    }
}

fn strings_of(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            other => {
                tracing::debug!(kind = %json_kind(other), "Skipping non-string image entry");
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
