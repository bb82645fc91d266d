//! Error Handling Module
//!
//! Every failure inside the generation pipeline is expressed as a [`DiagramError`].
//! Provider-originating failures are further grouped into an [`ErrorClass`], which is
//! the only thing the orchestrator looks at when choosing the next fallback step.
//!
//! ```rust
//! use eduvis::error::{DiagramError, ErrorClass};
//!
//! let error = DiagramError::auth_failure("openai", "no API key configured");
//! assert_eq!(error.class(), Some(ErrorClass::AuthFailure));
//! assert!(!error.is_retryable());
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DiagramError>;

/// Failure classes the fallback state machine branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The call did not complete within its time budget.
    Timeout,
    /// Credentials are missing or were rejected.
    AuthFailure,
    /// The provider answered, but not with a usable artifact.
    MalformedResponse,
    /// The provider answered with nothing to extract.
    EmptyResult,
    /// Connection, HTTP status or any other unclassified failure.
    TransportError,
}

impl ErrorClass {
    /// Stable lowercase name, used in log fields.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::AuthFailure => "auth_failure",
            Self::MalformedResponse => "malformed_response",
            Self::EmptyResult => "empty_result",
            Self::TransportError => "transport_error",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the diagram generation layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiagramError {
    /// The caller supplied an unusable request (e.g. an empty topic).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or rejected credentials.
    #[error("Authentication failed for {provider}: {message}")]
    AuthFailure { provider: String, message: String },

    /// The provider call exceeded its deadline.
    #[error("Request to {provider} timed out after {elapsed_ms}ms")]
    Timeout { provider: String, elapsed_ms: u64 },

    /// Network failure or unexpected HTTP status.
    #[error("Transport error from {provider}{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    TransportError {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// The response could not be turned into an artifact.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The response contained no artifact at all.
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// Construction-time failure while assembling adapters.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DiagramError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn auth_failure(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AuthFailure {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn timeout(provider: impl Into<String>, elapsed: Duration) -> Self {
        Self::Timeout {
            provider: provider.into(),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportError {
            provider: provider.into(),
            status: None,
            message: message.into(),
        }
    }

    pub fn http_status(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::TransportError {
            provider: provider.into(),
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::EmptyResult(message.into())
    }

    /// Fallback class of this error.
    ///
    /// `None` for errors that never reach the fallback chain
    /// (`InvalidRequest`, `Configuration`).
    pub const fn class(&self) -> Option<ErrorClass> {
        match self {
            Self::AuthFailure { .. } => Some(ErrorClass::AuthFailure),
            Self::Timeout { .. } => Some(ErrorClass::Timeout),
            Self::TransportError { .. } => Some(ErrorClass::TransportError),
            Self::MalformedResponse(_) => Some(ErrorClass::MalformedResponse),
            Self::EmptyResult(_) => Some(ErrorClass::EmptyResult),
            Self::InvalidRequest(_) | Self::Configuration(_) => None,
        }
    }

    /// Class used by the state machine. Anything without a class of its own is
    /// treated as a transport failure.
    pub fn fallback_class(&self) -> ErrorClass {
        self.class().unwrap_or(ErrorClass::TransportError)
    }

    /// Whether trying another model or provider could help.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.class(),
            Some(
                ErrorClass::Timeout
                    | ErrorClass::TransportError
                    | ErrorClass::MalformedResponse
                    | ErrorClass::EmptyResult
            )
        )
    }

    /// HTTP status attached to the error, if any.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::TransportError { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DiagramError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(format!("invalid JSON: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_follow_variants() {
        assert_eq!(
            DiagramError::timeout("anthropic", Duration::from_secs(3)).class(),
            Some(ErrorClass::Timeout)
        );
        assert_eq!(
            DiagramError::http_status("openai", 500, "boom").class(),
            Some(ErrorClass::TransportError)
        );
        assert_eq!(
            DiagramError::malformed("no svg").class(),
            Some(ErrorClass::MalformedResponse)
        );
        assert_eq!(DiagramError::empty("no artifacts").class(), Some(ErrorClass::EmptyResult));
        assert_eq!(DiagramError::invalid_request("empty topic").class(), None);
    }

    #[test]
    fn unclassified_errors_fall_back_to_transport() {
        let err = DiagramError::Configuration("tls backend".into());
        assert_eq!(err.fallback_class(), ErrorClass::TransportError);
    }

    #[test]
    fn auth_failure_is_not_retryable() {
        assert!(!DiagramError::auth_failure("openai", "missing key").is_retryable());
        assert!(DiagramError::empty("nothing").is_retryable());
        assert!(!DiagramError::invalid_request("blank").is_retryable());
    }

    #[test]
    fn transport_display_includes_status() {
        let err = DiagramError::http_status("bedrock", 429, "throttled");
        assert_eq!(err.status_code(), Some(429));
        let msg = err.to_string();
        assert!(msg.contains("HTTP 429"));
        assert!(msg.contains("throttled"));

        let err = DiagramError::transport("bedrock", "connection reset");
        assert!(!err.to_string().contains("HTTP"));
    }

    #[test]
    fn json_errors_are_malformed_responses() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DiagramError = parse_err.into();
        assert_eq!(err.class(), Some(ErrorClass::MalformedResponse));
    }
}
