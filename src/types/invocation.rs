//! Per-attempt diagnostics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorClass;

/// Record of one step of the fallback chain. Lives only as long as the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInvocation {
    pub provider_id: String,
    pub model: String,
    /// `false` when the adapter was skipped without a network call.
    pub attempted: bool,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_class: Option<ErrorClass>,
    pub latency_ms: u64,
    pub started_at: DateTime<Utc>,
}

impl ProviderInvocation {
    /// An adapter that was not called because it has no credentials.
    pub fn skipped(provider_id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            model: model.into(),
            attempted: false,
            succeeded: false,
            error_class: Some(ErrorClass::AuthFailure),
            latency_ms: 0,
            started_at: Utc::now(),
        }
    }

    pub fn finished(
        provider_id: impl Into<String>,
        model: impl Into<String>,
        started_at: DateTime<Utc>,
        latency_ms: u64,
        error_class: Option<ErrorClass>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            model: model.into(),
            attempted: true,
            succeeded: error_class.is_none(),
            error_class,
            latency_ms,
            started_at,
        }
    }
}
