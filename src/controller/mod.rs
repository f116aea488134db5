//! # Controller
//!
//! Core controller modules for the Cert Check Controller.
//!
//! - `certificate`: Validity window extraction from PEM certificates
//! - `expiry`: Day-granular expiry classification
//! - `aggregate`: Status, alerts, gauge samples and next wake for one CertCheck
//! - `mapper`: Secret changes to CertCheck requests
//! - `backoff`: Fibonacci backoff mechanism for retries
//! - `reconciler`: Core reconciliation logic
//! - `server`: HTTP server for metrics and health checks

pub mod aggregate;
pub mod backoff;
pub mod certificate;
pub mod expiry;
pub mod mapper;
pub mod reconciler;
pub mod server;
