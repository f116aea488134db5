//! Cert Check Controller Library
//!
//! Kubernetes controller that watches TLS secrets selected by `CertCheck`
//! resources and reports certificates that are expired or about to expire.
//! Tests are included in the module files and under `tests/`.
//!
//! ## Quick Start
//!
//! ```rust
//! use cert_check_controller::prelude::*;
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod prelude;
pub mod runtime;
