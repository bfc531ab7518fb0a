//! Client-side routing subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation target ("/feedback/ex42?step=2")
//!     → router.rs (split into Location, decode segments)
//!     → pattern.rs (match tagged segments, capture params)
//!     → Return: ResolvedRoute or NotFound
//!     → navigator.rs (commit NavigationState, update history)
//!
//! Route Compilation (at startup):
//!     RouteSpec[] (literal table)
//!     → Parse patterns
//!     → Check names unique, patterns disjoint
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex; segment-by-segment comparison only
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod navigator;
pub mod pattern;
pub mod router;
pub mod table;

pub use navigator::{NavigationState, Navigator};
pub use pattern::{Params, PathPattern, PatternError, Segment};
pub use router::{Location, ResolvedRoute, RouteError, Router, ViewInputs};
pub use table::{RouteDef, RouteSpec, RouteTable, TableError, ViewRef};
