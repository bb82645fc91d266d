//! Amazon Bedrock HTTP error classification.
//!
//! The Bedrock runtime returns JSON error bodies shaped like
//! `{ "message": "...", "__type": "..." }`. The exception type is more precise than
//! the status code, so it is consulted first.

use std::time::Instant;

use serde_json::Value;

use crate::error::DiagramError;
use crate::providers::http::{classify_http_error, extract_error_message};

fn extract_error_type(body_text: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(body_text).ok()?;
    json.get("__type")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub(crate) fn classify_bedrock_http_error(
    provider_id: &str,
    status: u16,
    body_text: &str,
    started: Instant,
) -> DiagramError {
    let err_type = extract_error_type(body_text).unwrap_or_default().to_lowercase();
    let message = || extract_error_message(body_text).unwrap_or_else(|| body_text.trim().to_string());

    if err_type.contains("accessdenied")
        || err_type.contains("unrecognizedclient")
        || err_type.contains("expiredtoken")
    {
        return DiagramError::auth_failure(provider_id, message());
    }
    if err_type.contains("modeltimeout") {
        return DiagramError::timeout(provider_id, started.elapsed());
    }
    if err_type.contains("throttl") {
        return DiagramError::http_status(provider_id, 429, message());
    }

    classify_http_error(provider_id, status, body_text, started)
}
