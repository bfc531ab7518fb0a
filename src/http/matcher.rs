//! Request matching for the dev server.
//!
//! # Responsibilities
//! - Match the Host header against the allowed-hosts list
//! - Match path prefixes for proxy rules
//!
//! # Design Decisions
//! - Host matching is case-insensitive and ignores the port
//! - Loopback names are always allowed
//! - A leading `.` in an allowed host also admits its subdomains
//! - Path prefixes are a plain string match (`/api` also matches `/apiary`)

use axum::body::Body;
use axum::http::{header::HOST, Request};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

const LOOPBACK: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

/// Matches the Host header against an allow list.
#[derive(Debug, Clone, Default)]
pub struct HostMatcher {
    allowed: Vec<String>,
}

impl HostMatcher {
    /// An empty list allows every host.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: hosts
                .into_iter()
                .map(|h| h.as_ref().trim().to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Check a raw `Host` value such as `example.com:2303` or `[::1]:2303`.
    pub fn allows(&self, host: &str) -> bool {
        if self.allowed.is_empty() {
            return true;
        }

        let name = strip_port(host).to_lowercase();
        if LOOPBACK.contains(&name.as_str()) {
            return true;
        }

        self.allowed.iter().any(|allowed| match allowed.strip_prefix('.') {
            Some(domain) => name == domain || name.ends_with(allowed.as_str()),
            None => name == *allowed,
        })
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        let host = req
            .headers()
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| req.uri().authority().map(|a| a.as_str()));

        match host {
            Some(host) => self.allows(host),
            None => self.allowed.is_empty(),
        }
    }
}

fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split_once(']').map(|(ip, _)| ip).unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Matches requests whose path starts with a prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches_path(&self, path: &str) -> bool {
        path.starts_with(self.prefix.as_str())
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matches_path(req.uri().path())
    }
}
