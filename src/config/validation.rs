//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, port non-zero)
//! - Check proxy rules (prefix shape, unique prefixes, parseable targets)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DevServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::app;
use crate::config::schema::DevServerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.port must be non-zero")]
    ZeroPort,

    #[error("server.host must not be empty")]
    EmptyHost,

    #[error("router.snapshot {0} does not exist")]
    UnknownSnapshot(u8),

    #[error("proxy prefix {0:?} must start with '/' and not end with '/'")]
    InvalidPrefix(String),

    #[error("proxy prefix {0:?} is declared more than once")]
    DuplicatePrefix(String),

    #[error("proxy target {target:?} is invalid: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a configuration, collecting every problem.
pub fn validate_config(config: &DevServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if !config.server.expose_host && config.server.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    if app::snapshot(config.router.snapshot).is_none() {
        errors.push(ValidationError::UnknownSnapshot(config.router.snapshot));
    }

    let mut prefixes = HashSet::new();
    for rule in &config.proxy {
        let prefix = rule.prefix.as_str();
        if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
            errors.push(ValidationError::InvalidPrefix(rule.prefix.clone()));
        } else if !prefixes.insert(prefix) {
            errors.push(ValidationError::DuplicatePrefix(rule.prefix.clone()));
        }

        if let Err(reason) = check_target(&rule.target) {
            errors.push(ValidationError::InvalidTarget {
                target: rule.target.clone(),
                reason,
            });
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_secs"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_target(target: &str) -> Result<(), String> {
    let url = Url::parse(target).map_err(|e| e.to_string())?;
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme {:?}", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("query and fragment are not allowed".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ProxyRuleConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&DevServerConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = DevServerConfig::default();
        config.server.port = 0;
        config.router.snapshot = 9;
        config.timeouts.upstream_secs = 0;
        config.proxy.push(ProxyRuleConfig {
            prefix: "api/".into(),
            target: "ftp://backend".into(),
            change_origin: true,
            rewrite: true,
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroPort));
        assert!(errors.contains(&ValidationError::UnknownSnapshot(9)));
        assert!(errors.contains(&ValidationError::ZeroTimeout("upstream_secs")));
        assert!(errors.contains(&ValidationError::InvalidPrefix("api/".into())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidTarget { .. })));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_duplicate_prefix() {
        let mut config = DevServerConfig::default();
        config.proxy.push(ProxyRuleConfig::default());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicatePrefix("/api".into())]);
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = DevServerConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidMetricsAddress("nope".into())]
        );
    }
}
