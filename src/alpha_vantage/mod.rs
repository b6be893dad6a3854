// =============================================================================
// Alpha Vantage — indicator source abstraction and response classification
// =============================================================================
//
// The HTTP handler talks to an `IndicatorSource`, never to reqwest directly,
// so the pipeline can be driven by a stub in tests.  Classification of the
// decoded payload is a pure function shared by every source.
// =============================================================================

pub mod client;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::IndicatorRequest;

/// Explicit failure; wins over any data present in the same body.
const ERROR_KEY: &str = "Error Message";

/// Throttling notices; only an error when the data key is absent.
const NOTICE_KEYS: &[&str] = &["Note", "Information"];

/// Raw, successfully classified API payload.
///
/// Guaranteed to contain the descriptor's `Technical Analysis: <function>` key.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorResponse(pub Map<String, Value>);

impl IndicatorResponse {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Why a fetch did not yield indicator data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure or non-2xx status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The API answered with an explicit error or throttling notice.
    #[error("API error: {0}")]
    ApiError(String),

    /// The payload carried neither data nor an error field.
    #[error("unexpected API response format: {0}")]
    UnexpectedFormat(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

/// Anything that can produce indicator payloads for a validated request.
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    async fn fetch(&self, req: &IndicatorRequest) -> Result<IndicatorResponse, FetchError>;
}

/// Classify a decoded JSON body as data, API error, or unknown shape.
///
/// `"Error Message"` is checked first.  Otherwise the data key takes
/// precedence over the throttling notices.
pub fn classify(body: Value, data_key: &str) -> Result<IndicatorResponse, FetchError> {
    let Value::Object(map) = body else {
        return Err(FetchError::UnexpectedFormat(format!(
            "expected a JSON object, got {}",
            json_kind(&body)
        )));
    };

    if let Some(msg) = map.get(ERROR_KEY) {
        return Err(FetchError::ApiError(message_text(msg)));
    }

    if map.contains_key(data_key) {
        return Ok(IndicatorResponse(map));
    }

    for key in NOTICE_KEYS {
        if let Some(msg) = map.get(*key) {
            return Err(FetchError::ApiError(message_text(msg)));
        }
    }

    Err(FetchError::UnexpectedFormat(format!(
        "missing '{data_key}' key"
    )))
}

fn message_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KEY: &str = "Technical Analysis: HT_PHASOR";

    #[test]
    fn error_message_is_api_error() {
        let body = json!({ "Error Message": "Invalid API call." });
        match classify(body, KEY) {
            Err(FetchError::ApiError(msg)) => assert_eq!(msg, "Invalid API call."),
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[test]
    fn throttling_note_is_api_error() {
        let body = json!({ "Note": "Thank you for using Alpha Vantage!" });
        assert!(matches!(classify(body, KEY), Err(FetchError::ApiError(_))));

        let body = json!({ "Information": "rate limit" });
        assert!(matches!(classify(body, KEY), Err(FetchError::ApiError(_))));
    }

    #[test]
    fn missing_both_keys_is_unexpected_format() {
        let body = json!({ "Meta Data": { "1: Symbol": "IBM" } });
        assert!(matches!(
            classify(body, KEY),
            Err(FetchError::UnexpectedFormat(_))
        ));
    }

    #[test]
    fn non_object_is_unexpected_format() {
        assert!(matches!(
            classify(json!([1, 2, 3]), KEY),
            Err(FetchError::UnexpectedFormat(_))
        ));
    }

    #[test]
    fn error_message_wins_over_data() {
        let body = json!({
            "Error Message": "Invalid API call.",
            KEY: { "2023-01-01": { "InPhase": "1.0", "Quadrature": "0.2" } }
        });
        match classify(body, KEY) {
            Err(FetchError::ApiError(msg)) => assert_eq!(msg, "Invalid API call."),
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[test]
    fn data_wins_over_throttling_note() {
        let body = json!({
            "Note": "Thank you for using Alpha Vantage!",
            KEY: { "2023-01-01": { "InPhase": "1.0", "Quadrature": "0.2" } }
        });
        assert!(classify(body, KEY).is_ok());
    }

    #[test]
    fn data_key_is_success() {
        let body = json!({
            "Meta Data": {},
            KEY: { "2023-01-01": { "InPhase": "1.0", "Quadrature": "0.2" } }
        });
        let resp = classify(body, KEY).unwrap();
        assert!(resp.get(KEY).is_some());
    }
}
