//! Shared JSON-over-HTTP execution for provider adapters.
//!
//! One POST per call, no retries. Status codes and reqwest failures are mapped
//! onto the fallback error taxonomy here so every adapter classifies them the
//! same way.

use std::time::Instant;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::error::{DiagramError, Result};
use crate::observability::ProviderTracer;

/// Pull a human-readable message out of a JSON error body.
///
/// Handles `{"message": ..}`, `{"Message": ..}`, `{"errorMessage": ..}` and
/// `{"error": {"message": ..}}`.
pub(crate) fn extract_error_message(body_text: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(body_text).ok()?;

    let message = json
        .get("message")
        .and_then(|v| v.as_str())
        .or_else(|| json.get("Message").and_then(|v| v.as_str()))
        .or_else(|| json.get("errorMessage").and_then(|v| v.as_str()))
        .or_else(|| {
            json.get("error")
                .and_then(|v| v.get("message"))
                .and_then(|v| v.as_str())
        })
        .map(|s| s.trim().to_string())?;

    (!message.is_empty()).then_some(message)
}

/// Map a non-success status to an error.
pub(crate) fn classify_http_error(
    provider_id: &str,
    status: u16,
    body_text: &str,
    started: Instant,
) -> DiagramError {
    let message = extract_error_message(body_text).unwrap_or_else(|| {
        let trimmed = body_text.trim();
        if trimmed.is_empty() {
            format!("HTTP {status} with empty body")
        } else {
            trimmed.to_string()
        }
    });

    match status {
        401 | 403 => DiagramError::auth_failure(provider_id, message),
        408 | 504 => DiagramError::timeout(provider_id, started.elapsed()),
        _ => DiagramError::http_status(provider_id, status, message),
    }
}

fn classify_send_error(provider_id: &str, err: &reqwest::Error, started: Instant) -> DiagramError {
    if err.is_timeout() {
        DiagramError::timeout(provider_id, started.elapsed())
    } else {
        DiagramError::transport(provider_id, err.to_string())
    }
}

/// `Authorization: Bearer <token>` plus JSON content type.
pub(crate) fn bearer_headers(provider_id: &str, token: &str) -> Result<HeaderMap> {
    let mut headers = json_headers();
    let value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| DiagramError::auth_failure(provider_id, format!("invalid API key: {e}")))?;
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

pub(crate) fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

pub(crate) fn insert_header(
    headers: &mut HeaderMap,
    provider_id: &str,
    name: &'static str,
    value: &str,
) -> Result<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| DiagramError::auth_failure(provider_id, format!("invalid {name} header: {e}")))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

/// Maps `(provider_id, status, body_text, started)` of a failed call to an error.
pub(crate) type ErrorClassifier = fn(&str, u16, &str, Instant) -> DiagramError;

/// POST `body` to `url` and decode the JSON answer.
pub(crate) async fn post_json(
    client: &reqwest::Client,
    provider_id: &str,
    model: &str,
    url: &str,
    headers: HeaderMap,
    body: &Value,
) -> Result<Value> {
    post_json_classified(client, provider_id, model, url, headers, body, classify_http_error).await
}

/// [`post_json`] with a provider-specific status classifier.
pub(crate) async fn post_json_classified(
    client: &reqwest::Client,
    provider_id: &str,
    model: &str,
    url: &str,
    headers: HeaderMap,
    body: &Value,
    classify: ErrorClassifier,
) -> Result<Value> {
    let tracer = ProviderTracer::new(provider_id, model);
    let started = Instant::now();
    tracer.trace_request_start("POST", url);
    let payload = serde_json::to_vec(body)?;
    tracer.trace_request_details(&headers, payload.len());

    let resp = client
        .post(url)
        .headers(headers)
        .body(payload)
        .send()
        .await
        .map_err(|e| {
            let err = classify_send_error(provider_id, &e, started);
            tracer.trace_request_error(started, None, &err.to_string());
            err
        })?;

    let status = resp.status();
    let text = resp.text().await.map_err(|e| {
        let err = classify_send_error(provider_id, &e, started);
        tracer.trace_request_error(started, Some(status.as_u16()), &err.to_string());
        err
    })?;

    if !status.is_success() {
        tracer.trace_request_error(started, Some(status.as_u16()), &text);
        return Err(classify(provider_id, status.as_u16(), &text, started));
    }

    tracer.trace_request_complete(started, status.as_u16(), text.len());
    serde_json::from_str(&text)
        .map_err(|e| DiagramError::malformed(format!("{provider_id} returned invalid JSON: {e}")))
}
