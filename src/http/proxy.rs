//! Path-prefix proxying to a backend origin.
//!
//! # Responsibilities
//! - Compile proxy rules from configuration
//! - Pick the rule for a request path (longest prefix wins)
//! - Rewrite the path (strip the prefix) and the Host header
//! - Forward the request and stream the response back
//!
//! # Design Decisions
//! - Bodies are streamed in both directions; nothing is buffered
//! - No retries: a dev proxy surfaces backend failures as they happen
//! - Upstream failure → 502, upstream timeout → 504

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::HOST;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{HeaderValue, Request, Response, StatusCode, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use thiserror::Error;
use url::Url;

use crate::config::ProxyRuleConfig;
use crate::http::matcher::PathPrefixMatcher;
use crate::http::response::strip_hop_by_hop;

/// HTTP client used for upstream calls.
pub type UpstreamClient = Client<HttpConnector, Body>;

/// Errors raised while proxying.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid proxy target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("failed to build upstream request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

impl ProxyError {
    /// Status returned to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::InvalidTarget { .. } | ProxyError::Request(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// A compiled proxy rule.
#[derive(Debug, Clone)]
pub struct ProxyRule {
    matcher: PathPrefixMatcher,
    authority: Authority,
    host_header: HeaderValue,
    base_path: String,
    change_origin: bool,
    rewrite: bool,
}

impl ProxyRule {
    pub fn from_config(config: &ProxyRuleConfig) -> Result<Self, ProxyError> {
        let invalid = |reason: String| ProxyError::InvalidTarget {
            target: config.target.clone(),
            reason,
        };

        let url = Url::parse(&config.target).map_err(|e| invalid(e.to_string()))?;
        if url.scheme() != "http" {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        let host = url
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let host_header = HeaderValue::from_str(&authority).map_err(|e| invalid(e.to_string()))?;
        let authority = Authority::from_str(&authority).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            matcher: PathPrefixMatcher::new(config.prefix.clone()),
            authority,
            host_header,
            base_path: url.path().trim_end_matches('/').to_string(),
            change_origin: config.change_origin,
            rewrite: config.rewrite,
        })
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches_path(path)
    }

    /// Path and query sent upstream for an incoming path and query.
    ///
    /// With `rewrite` the prefix is cut from the front of the path, so
    /// `/apiary` under `/api` goes upstream as `/ary`.
    pub fn upstream_path(&self, path: &str, query: Option<&str>) -> String {
        let rest = if self.rewrite {
            path.strip_prefix(self.prefix()).unwrap_or(path)
        } else {
            path
        };

        let mut target = self.base_path.clone();
        if !rest.starts_with('/') {
            target.push('/');
        }
        target.push_str(rest);

        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }
        target
    }

    pub fn upstream_uri(&self, uri: &Uri) -> Result<Uri, ProxyError> {
        let path_and_query = self.upstream_path(uri.path(), uri.query());
        let path_and_query = PathAndQuery::from_str(&path_and_query)
            .map_err(|e| ProxyError::Request(e.into()))?;

        Ok(Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?)
    }
}

/// Proxy rules ordered for lookup.
#[derive(Debug, Clone, Default)]
pub struct ProxyTable {
    rules: Vec<ProxyRule>,
}

impl ProxyTable {
    pub fn from_configs(configs: &[ProxyRuleConfig]) -> Result<Self, ProxyError> {
        let mut rules = configs
            .iter()
            .map(ProxyRule::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        // Longest prefix first so nested prefixes win over their parents.
        rules.sort_by(|a, b| b.prefix().len().cmp(&a.prefix().len()));
        Ok(Self { rules })
    }

    pub fn find(&self, path: &str) -> Option<&ProxyRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Forward one request upstream and return the streamed response.
pub async fn forward(
    client: &UpstreamClient,
    rule: &ProxyRule,
    request: Request<Body>,
    peer: Option<SocketAddr>,
    timeout: Duration,
) -> Result<Response<Body>, ProxyError> {
    let (parts, body) = request.into_parts();
    let uri = rule.upstream_uri(&parts.uri)?;

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);

    if rule.change_origin {
        if let Some(original) = headers.insert(HOST, rule.host_header.clone()) {
            headers.insert("x-forwarded-host", original);
        }
    }

    if let Some(peer) = peer {
        let forwarded_for = match headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{}, {}", existing, peer.ip()),
            None => peer.ip().to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
            headers.insert("x-forwarded-for", value);
        }
    }

    let mut upstream = Request::builder().method(parts.method).uri(uri).body(body)?;
    *upstream.headers_mut() = headers;

    let response = tokio::time::timeout(timeout, client.request(upstream))
        .await
        .map_err(|_| ProxyError::Timeout(timeout))??;

    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Ok(Response::from_parts(parts, Body::new(body)))
}
