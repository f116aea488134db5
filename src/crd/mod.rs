//! # Custom Resource Definitions
//!
//! CRD types for the cert-check controller.
//!
//! ## Module Structure
//!
//! - `spec.rs` - The `CertCheck` resource and its spec
//! - `selector.rs` - Label selector over TLS secrets
//! - `status.rs` - Status written back after every pass

mod selector;
mod spec;
mod status;

pub use selector::{CertificateSelector, SelectorError, SelectorRequirement};
pub use spec::{CertCheck, CertCheckSpec};
pub use status::{CertCheckStatus, CertificateStatus};
