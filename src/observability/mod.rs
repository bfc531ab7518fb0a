//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing + http subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr (human or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging via `tracing`; `RUST_LOG` overrides the config level
//! - Request ID flows through every HTTP span
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
