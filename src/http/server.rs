//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the single dispatch handler
//! - Wire up middleware (host check, CORS, tracing, request ID)
//! - Dispatch: proxy rule → forward upstream; otherwise → client route resolution
//! - Serve the application shell for resolved routes and a 404 page otherwise
//! - Graceful shutdown

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header::ALLOW, HeaderValue, Method, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{client::legacy::connect::HttpConnector, client::legacy::Client, rt::TokioExecutor};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::DevServerConfig;
use crate::http::matcher::HostMatcher;
use crate::http::middleware::host_check_middleware;
use crate::http::proxy::{self, ProxyError, ProxyRule, ProxyTable, UpstreamClient};
use crate::http::request::{request_id, MakeRequestUuid};
use crate::http::response::{not_found_response, shell_response, DEFAULT_SHELL};
use crate::lifecycle::signals;
use crate::observability::metrics;
use crate::routing::Router as RouteResolver;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: RouteResolver,
    pub proxies: Arc<ProxyTable>,
    pub client: UpstreamClient,
    pub shell: Arc<str>,
    pub upstream_timeout: Duration,
}

/// Errors raised while assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to read shell {path}: {source}")]
    Shell {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid proxy rule: {0}")]
    Proxy(#[from] ProxyError),
}

/// Development server: client routes plus backend proxy.
pub struct DevServer {
    app: Router,
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new dev server with the given configuration and route resolver.
    pub fn new(config: DevServerConfig, routes: RouteResolver) -> Result<Self, ServerError> {
        let proxies = Arc::new(ProxyTable::from_configs(&config.proxy)?);
        let shell = load_shell(config.server.shell_path.as_deref())?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            routes,
            proxies,
            client,
            shell,
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
        };

        let app = Self::build_app(&config, state);
        Ok(Self { app, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_app(config: &DevServerConfig, state: AppState) -> Router {
        let hosts = Arc::new(HostMatcher::new(&config.server.allowed_hosts));

        let app = Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(middleware::from_fn_with_state(hosts, host_check_middleware));

        let app = if config.server.cors {
            app.layer(CorsLayer::permissive())
        } else {
            app
        };

        app.layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until Ctrl+C or the shutdown receiver fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            proxy_rules = self.config.proxy.len(),
            allowed_hosts = ?self.config.server.allowed_hosts,
            cors = self.config.server.cors,
            "Dev server starting"
        );

        let app = self.app.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(signals::shutdown_requested(shutdown))
            .await?;

        tracing::info!("Dev server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &DevServerConfig {
        &self.config
    }
}

fn load_shell(path: Option<&Path>) -> Result<Arc<str>, ServerError> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map(Arc::from)
            .map_err(|source| ServerError::Shell {
                path: path.to_path_buf(),
                source,
            }),
        None => Ok(Arc::from(DEFAULT_SHELL)),
    }
}

/// Single entry point for every request.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    if let Some(rule) = state.proxies.find(request.uri().path()) {
        return proxy_request(&state, rule, request).await;
    }

    match *request.method() {
        Method::GET | Method::HEAD => serve_client_route(&state, &request),
        _ => {
            let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
            response
        }
    }
}

async fn proxy_request(state: &AppState, rule: &ProxyRule, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        prefix = %rule.prefix(),
        "Proxying request"
    );

    match proxy::forward(&state.client, rule, request, peer, state.upstream_timeout).await {
        Ok(response) => {
            metrics::record_proxy(rule.prefix(), response.status().as_u16(), start_time);
            response
        }
        Err(e) => {
            let status = e.status();
            tracing::error!(request_id = %request_id, path = %path, error = %e, "Upstream error");
            metrics::record_proxy(rule.prefix(), status.as_u16(), start_time);
            (status, e.to_string()).into_response()
        }
    }
}

fn serve_client_route(state: &AppState, request: &Request<Body>) -> Response {
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    match state.routes.resolve(target) {
        Ok(route) => {
            metrics::record_shell(&route.name, 200);
            shell_response(&state.shell, &route)
        }
        Err(e) => {
            tracing::debug!(request_id = %request_id(request), error = %e, "Serving not-found page");
            metrics::record_shell("none", 404);
            not_found_response()
        }
    }
}
