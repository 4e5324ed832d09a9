//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the redirect gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, scheme detection).
    pub listener: ListenerConfig,

    /// Where requests go when no rule redirects them.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Redirect rules, evaluated in file order.
    pub redirects: Vec<RedirectConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Take the request scheme from `X-Forwarded-Proto`.
    /// Only enable behind a TLS-terminating proxy that sets the header.
    pub trust_forwarded_proto: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            trust_forwarded_proto: false,
        }
    }
}

/// Pass-through target.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Origin URL (e.g., "http://127.0.0.1:3000"). Unset means
    /// unmatched requests get a 404.
    pub address: Option<String>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// One `[[redirects]]` table.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RedirectConfig {
    /// Source pattern, e.g. `/blog/:slug` or `//old.example.com/*`.
    pub from: String,

    /// Destination, e.g. `/posts/:slug` or `https://example.com/:splat`.
    pub to: String,

    /// Response status (default: 301).
    #[serde(default = "default_status")]
    pub status: u16,
}

fn default_status() -> u16 {
    301
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.upstream.address.is_none());
        assert!(config.redirects.is_empty());
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_redirect_tables() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"
            trust_forwarded_proto = true

            [upstream]
            address = "http://127.0.0.1:3000"

            [observability]
            log_format = "json"

            [[redirects]]
            from = "/blog/:slug"
            to = "/posts/:slug"

            [[redirects]]
            from = "/old/*"
            to = "/new/:splat"
            status = 302
            "#,
        )
        .unwrap();

        assert!(config.listener.trust_forwarded_proto);
        assert_eq!(config.upstream.address.as_deref(), Some("http://127.0.0.1:3000"));
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.redirects.len(), 2);
        assert_eq!(config.redirects[0].status, 301);
        assert_eq!(config.redirects[1].status, 302);
        assert_eq!(config.redirects[1].to, "/new/:splat");
    }
}
