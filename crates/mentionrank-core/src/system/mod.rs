//! # System Module
//!
//! Lifecycle control and summary metrics.
//!
//! The lifecycle here is synchronous and free of any runtime. Hosts supply
//! the readiness notification, the termination signal and the completion
//! handle, and call [`Lifecycle::start`] / [`Lifecycle::shutdown`] at the
//! right moments.

mod lifecycle;
mod metrics;

pub use lifecycle::*;
pub use metrics::*;
