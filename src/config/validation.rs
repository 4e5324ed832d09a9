//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges (timeouts > 0, known log levels)
//! - Check every rule status can be sent as an HTTP status line
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Rule patterns are not linted; a malformed pattern is skipped per request

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    BindAddress(String),
    UpstreamAddress { address: String, reason: String },
    ZeroRequestTimeout,
    LogLevel(String),
    RuleStatus { index: usize, status: u16 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::BindAddress(addr) => write!(f, "invalid bind address {:?}", addr),
            ValidationError::UpstreamAddress { address, reason } => {
                write!(f, "invalid upstream address {:?}: {}", address, reason)
            }
            ValidationError::ZeroRequestTimeout => write!(f, "timeouts.request_secs must be > 0"),
            ValidationError::LogLevel(level) => write!(f, "unknown log level {:?}", level),
            ValidationError::RuleStatus { index, status } => {
                write!(f, "redirects[{}]: status {} is not an HTTP status code", index, status)
            }
        }
    }
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if let Some(address) = &config.upstream.address {
        if let Err(reason) = check_upstream(address) {
            errors.push(ValidationError::UpstreamAddress {
                address: address.clone(),
                reason,
            });
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    for (index, rule) in config.redirects.iter().enumerate() {
        if !(100..=999).contains(&rule.status) {
            errors.push(ValidationError::RuleStatus {
                index,
                status: rule.status,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The upstream must be a plain `http://host[:port]` origin.
pub(crate) fn check_upstream(address: &str) -> Result<Url, String> {
    let url = Url::parse(address).map_err(|e| e.to_string())?;
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme {:?}", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RedirectConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.upstream.address = Some("https://origin.internal".into());
        config.timeouts.request_secs = 0;
        config.observability.log_level = "loud".into();
        config.redirects.push(RedirectConfig {
            from: "/a".into(),
            to: "/b".into(),
            status: 42,
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroRequestTimeout));
        assert!(errors.contains(&ValidationError::RuleStatus { index: 0, status: 42 }));
    }

    #[test]
    fn test_upstream_check() {
        assert!(check_upstream("http://127.0.0.1:3000").is_ok());
        assert!(check_upstream("ftp://127.0.0.1").is_err());
        assert!(check_upstream("127.0.0.1:3000").is_err());
    }
}
