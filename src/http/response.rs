//! Response construction and header hygiene.
//!
//! # Responsibilities
//! - Serve the application shell for resolved client routes
//! - Serve the not-found page when nothing resolves
//! - Strip hop-by-hop headers on both legs of a proxied exchange

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::routing::ResolvedRoute;

/// Header naming the resolved client route.
pub const X_ROUTE_NAME: &str = "x-route-name";

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Shell used when no `shell_path` is configured.
pub const DEFAULT_SHELL: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>Questionnaire</title>
  </head>
  <body>
    <div id="app"></div>
    <script type="module" src="/src/main.js"></script>
  </body>
</html>
"#;

const NOT_FOUND_PAGE: &str = r#"<!doctype html>
<html lang="en">
  <head><meta charset="UTF-8" /><title>Page not found</title></head>
  <body><h1>Page not found</h1><p><a href="/">Back to the start</a></p></body>
</html>
"#;

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

fn html(status: StatusCode, body: String) -> Response {
    let mut response = (status, Body::from(body)).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

/// The application shell for a resolved route.
pub fn shell_response(shell: &str, route: &ResolvedRoute) -> Response {
    let mut response = html(StatusCode::OK, shell.to_string());
    if let Ok(name) = HeaderValue::from_str(&route.name) {
        response.headers_mut().insert(X_ROUTE_NAME, name);
    }
    response
}

pub fn not_found_response() -> Response {
    html(StatusCode::NOT_FOUND, NOT_FOUND_PAGE.to_string())
}
