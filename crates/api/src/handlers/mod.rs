//! Per-source webhook handlers.
//!
//! Every handler follows the same pipeline: read raw bytes, parse,
//! authenticate, persist, publish (best-effort), respond. Sources differ
//! only in whether authentication runs before or after parsing.

pub mod telegram;
pub mod zoom;

use axum::http::HeaderMap;

use crate::error::AppError;

/// Parse the raw body as JSON, keeping the original text for storage.
fn parse_json_body(body: &[u8]) -> Result<(serde_json::Value, &str), AppError> {
    let invalid = |reason: String| {
        tracing::warn!(error = %reason, "Failed to decode JSON body");
        AppError::BadRequest("Invalid JSON".into())
    };

    let text = std::str::from_utf8(body).map_err(|e| invalid(e.to_string()))?;
    let value = serde_json::from_str(text).map_err(|e| invalid(e.to_string()))?;
    Ok((value, text))
}

/// Read a header as text. Values that are not visible ASCII count as absent.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
