//! Observability helpers
//!
//! Structured `tracing` events for provider calls, with credentials masked before they
//! reach any log sink. The library never installs a subscriber.

use std::time::Instant;

use reqwest::header::HeaderMap;
use tracing::{debug, error, info};

/// Mask a secret-looking value, keeping a short prefix and suffix for correlation.
pub fn mask_sensitive_value(value: &str) -> String {
    fn ends(s: &str, head: usize, tail: usize) -> String {
        let chars: Vec<char> = s.chars().collect();
        let prefix: String = chars[..head].iter().collect();
        let suffix: String = chars[chars.len() - tail..].iter().collect();
        format!("{prefix}...{suffix}")
    }

    if let Some(token) = value.strip_prefix("Bearer ") {
        if token.chars().count() > 8 {
            return format!("Bearer {}", ends(token, 4, 4));
        }
        return "Bearer ***".to_string();
    }
    let len = value.chars().count();
    if (value.starts_with("sk-") || value.starts_with("sk-ant-")) && len > 12 {
        return ends(value, 8, 4);
    }
    if len > 16 {
        ends(value, 6, 4)
    } else {
        "***".to_string()
    }
}

fn is_sensitive_header(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.contains("authorization") || name.contains("key") || name.contains("token")
}

/// Render headers as JSON with credentials masked.
pub fn format_headers_for_logging(headers: &HeaderMap) -> String {
    let map: std::collections::BTreeMap<&str, String> = headers
        .iter()
        .map(|(k, v)| {
            let value = v.to_str().unwrap_or("<invalid>");
            let shown = if is_sensitive_header(k.as_str()) {
                mask_sensitive_value(value)
            } else {
                value.to_string()
            };
            (k.as_str(), shown)
        })
        .collect();
    serde_json::to_string(&map).unwrap_or_else(|_| format!("{map:?}"))
}

/// Per-call provider tracing.
#[derive(Debug, Clone)]
pub struct ProviderTracer {
    provider: String,
    model: String,
}

impl ProviderTracer {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }

    pub fn trace_request_start(&self, method: &str, url: &str) {
        info!(provider = %self.provider, model = %self.model, method = %method, url = %url, "Request started");
    }

    pub fn trace_request_details(&self, headers: &HeaderMap, body_bytes: usize) {
        debug!(
            provider = %self.provider,
            model = %self.model,
            request_headers = %format_headers_for_logging(headers),
            body_bytes,
            "Request details"
        );
    }

    pub fn trace_request_complete(&self, started: Instant, status_code: u16, response_length: usize) {
        let duration_ms = started.elapsed().as_millis();
        info!(
            provider = %self.provider,
            model = %self.model,
            status_code,
            duration_ms,
            response_length,
            "Request completed"
        );
    }

    pub fn trace_request_error(&self, started: Instant, status_code: Option<u16>, error_text: &str) {
        let duration_ms = started.elapsed().as_millis();
        error!(
            provider = %self.provider,
            model = %self.model,
            status_code = ?status_code,
            error_text = %error_text,
            duration_ms,
            "Request failed"
        );
    }
}
