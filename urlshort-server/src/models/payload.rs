//! Wire shapes for the url endpoints

use serde::{Deserialize, Serialize};
use urlshort_registry::Entry;

/// Body of `POST /api/urls`. Both fields may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
}

/// Every url endpoint answers with this shape; `error` is empty on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlPayload {
    pub id: String,
    pub url: String,
    pub error: String,
}

impl UrlPayload {
    pub fn ok(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            error: String::new(),
        }
    }

    pub fn error(id: impl Into<String>, url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            error: error.into(),
        }
    }
}

impl From<Entry> for UrlPayload {
    fn from(entry: Entry) -> Self {
        Self::ok(entry.id, entry.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_fields_default_to_empty() {
        let req: RegisterRequest = serde_json::from_str(r#"{"url":"http://a.example"}"#).unwrap();
        assert_eq!(req.id, "");
        assert_eq!(req.url, "http://a.example");

        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.url, "");
    }

    #[test]
    fn payload_always_carries_error_field() {
        let json = serde_json::to_value(UrlPayload::ok("abc123", "http://a.example")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "abc123", "url": "http://a.example", "error": ""})
        );
    }
}
