//! Request middleware.

pub mod host_check;

pub use host_check::host_check_middleware;
