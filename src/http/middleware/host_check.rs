//! Host header enforcement.
//! Rejects requests for hosts outside `server.allowed_hosts`.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::HOST, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::matcher::{HostMatcher, Matcher};

pub async fn host_check_middleware(
    State(hosts): State<Arc<HostMatcher>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if hosts.matches(&req) {
        return next.run(req).await;
    }

    let host = req
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("<none>");
    tracing::warn!(host = %host, path = %req.uri().path(), "Blocked request for disallowed host");

    (
        StatusCode::FORBIDDEN,
        "Blocked request. This host is not allowed; add it to server.allowed_hosts.",
    )
        .into_response()
}
