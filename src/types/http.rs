//! HTTP configuration types.
//!
//! This module defines `HttpConfig` and its builder, used to configure the
//! reqwest client behind every provider adapter.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{DiagramError, Result};

/// Default per-request timeout. Provider calls must never hang the pipeline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(9);
/// Default TCP/TLS connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
/// Default user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("eduvis/", env!("CARGO_PKG_VERSION"));

/// HTTP configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout
    #[serde(with = "duration_option_serde")]
    pub timeout: Option<Duration>,
    /// Connection timeout
    #[serde(with = "duration_option_serde")]
    pub connect_timeout: Option<Duration>,
    /// Custom headers
    pub headers: HashMap<String, String>,
    /// Proxy settings
    pub proxy: Option<String>,
    /// User agent
    pub user_agent: Option<String>,
}

/// Builder for `HttpConfig` to construct configuration in a unified and safe way
#[derive(Debug, Clone, Default)]
pub struct HttpConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    headers: HashMap<String, String>,
    proxy: Option<String>,
    user_agent: Option<String>,
}

impl HttpConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn connect_timeout(mut self, connect_timeout: Option<Duration>) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
    pub fn user_agent<S: Into<String>>(mut self, user_agent: Option<S>) -> Self {
        self.user_agent = user_agent.map(|s| s.into());
        self
    }
    pub fn proxy<S: Into<String>>(mut self, proxy: Option<S>) -> Self {
        self.proxy = proxy.map(|s| s.into());
        self
    }
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Build the configuration. Unset timeouts fall back to the defaults so a
    /// client built from this config is always bounded.
    pub fn build(self) -> HttpConfig {
        HttpConfig {
            timeout: self.timeout.or(Some(DEFAULT_REQUEST_TIMEOUT)),
            connect_timeout: self.connect_timeout.or(Some(DEFAULT_CONNECT_TIMEOUT)),
            headers: self.headers,
            proxy: self.proxy,
            user_agent: self
                .user_agent
                .or_else(|| Some(DEFAULT_USER_AGENT.to_string())),
        }
    }
}

impl HttpConfig {
    /// Returns a builder for constructing `HttpConfig`
    pub fn builder() -> HttpConfigBuilder {
        HttpConfigBuilder::new()
    }

    /// Same config with a different request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build a reqwest client honoring this configuration.
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
            .connect_timeout(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT));

        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        if !self.headers.is_empty() {
            let mut headers = reqwest::header::HeaderMap::new();
            for (key, value) in &self.headers {
                let name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
                    .map_err(|e| DiagramError::Configuration(format!("invalid header name {key}: {e}")))?;
                let value = reqwest::header::HeaderValue::from_str(value)
                    .map_err(|e| DiagramError::Configuration(format!("invalid header value for {key}: {e}")))?;
                headers.insert(name, value);
            }
            builder = builder.default_headers(headers);
        }

        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| DiagramError::Configuration(format!("invalid proxy {proxy}: {e}")))?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| DiagramError::Configuration(format!("failed to build HTTP client: {e}")))
    }
}

// Helper module for Duration serialization
mod duration_option_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => d.as_secs().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<u64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfigBuilder::new().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_bounded() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout, Some(DEFAULT_REQUEST_TIMEOUT));
        assert_eq!(config.connect_timeout, Some(DEFAULT_CONNECT_TIMEOUT));
        assert!(config.user_agent.as_deref().unwrap_or_default().starts_with("eduvis/"));
    }

    #[test]
    fn builder_keeps_explicit_values() {
        let config = HttpConfig::builder()
            .timeout(Some(Duration::from_secs(2)))
            .header("x-trace", "on")
            .build();
        assert_eq!(config.timeout, Some(Duration::from_secs(2)));
        assert_eq!(config.headers.get("x-trace").map(String::as_str), Some("on"));
    }

    #[test]
    fn durations_serialize_as_seconds() {
        let config = HttpConfig::default().with_timeout(Duration::from_secs(4));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeout"], 4);
        let back: HttpConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back.timeout, Some(Duration::from_secs(4)));
    }

    #[test]
    fn invalid_header_is_a_configuration_error() {
        let config = HttpConfig::builder().header("bad header", "x").build();
        assert!(matches!(
            config.build_client(),
            Err(DiagramError::Configuration(_))
        ));
    }
}
