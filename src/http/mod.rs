//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → middleware/host_check.rs (allowed hosts)
//!     → proxy rule match? ─yes→ proxy.rs (rewrite, forward, stream back)
//!                         └no──→ routing::Router (resolve client route)
//!     → response.rs (shell page or 404 page)
//!     → Send to client
//! ```

pub mod matcher;
pub mod middleware;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{DevServer, ServerError};
