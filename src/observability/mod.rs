//! # Observability
//!
//! Prometheus metrics for the controller and the per-certificate state gauge.

pub mod metrics;

pub use metrics::*;
