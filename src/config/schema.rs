//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dev server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::app::LATEST_SNAPSHOT;

/// Root configuration for the dev server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevServerConfig {
    /// Bind address and host policy.
    pub server: ServerConfig,

    /// Client route table selection.
    pub router: RouterConfig,

    /// Path-prefix proxy rules.
    pub proxy: Vec<ProxyRuleConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            router: RouterConfig::default(),
            proxy: vec![ProxyRuleConfig::default()],
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind when not exposed.
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Bind every interface instead of `host`.
    pub expose_host: bool,

    /// Accepted `Host` header values. Empty accepts everything.
    /// Loopback names are always accepted.
    pub allowed_hosts: Vec<String>,

    /// Send permissive CORS headers.
    pub cors: bool,

    /// HTML shell served for client routes. Falls back to a built-in page.
    pub shell_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Address string passed to the listener.
    pub fn bind_address(&self) -> String {
        let host = if self.expose_host {
            "0.0.0.0"
        } else {
            self.host.as_str()
        };
        format!("{}:{}", host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 2303,
            expose_host: false,
            allowed_hosts: Vec::new(),
            cors: false,
            shell_path: None,
        }
    }
}

/// Route table selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Route table revision, 1 through the latest.
    pub snapshot: u8,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            snapshot: LATEST_SNAPSHOT,
        }
    }
}

/// Forward requests under a path prefix to another origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyRuleConfig {
    /// Path prefix to match; any path starting with it is proxied (e.g. "/api").
    pub prefix: String,

    /// Backend origin (e.g. "http://localhost:8000").
    pub target: String,

    /// Rewrite the `Host` header to the target's authority.
    #[serde(default = "default_true")]
    pub change_origin: bool,

    /// Strip the prefix before forwarding.
    #[serde(default = "default_true")]
    pub rewrite: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ProxyRuleConfig {
    fn default() -> Self {
        Self {
            prefix: "/api".to_string(),
            target: "http://localhost:8000".to_string(),
            change_origin: true,
            rewrite: true,
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time allowed for the upstream response headers in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: DevServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 2303);
        assert_eq!(config.server.bind_address(), "localhost:2303");
        assert_eq!(config.router.snapshot, LATEST_SNAPSHOT);
        assert_eq!(config.proxy.len(), 1);
        assert_eq!(config.proxy[0].prefix, "/api");
        assert_eq!(config.proxy[0].target, "http://localhost:8000");
        assert!(!config.server.cors);
    }

    #[test]
    fn test_exposed_host_and_rules() {
        let config: DevServerConfig = toml::from_str(
            r#"
            [server]
            expose_host = true
            port = 5173
            allowed_hosts = ["survey.example.org"]

            [[proxy]]
            prefix = "/api"
            target = "http://10.0.0.5:8000"
            change_origin = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_address(), "0.0.0.0:5173");
        assert_eq!(config.server.allowed_hosts, vec!["survey.example.org"]);
        assert_eq!(config.proxy.len(), 1);
        assert!(!config.proxy[0].change_origin);
        assert!(config.proxy[0].rewrite);
    }
}
