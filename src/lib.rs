//! Client route resolution and local dev server for the questionnaire app.
//!
//! The `routing` module is the core: a route table of tagged path patterns,
//! a resolver that maps paths to named views and parameters, and a
//! history-mode navigator. The `http` module serves those routes during
//! development and forwards `/api` calls to the backend.

pub mod app;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::DevServerConfig;
pub use http::DevServer;
pub use lifecycle::Shutdown;
pub use routing::{Navigator, RouteError, Router};
