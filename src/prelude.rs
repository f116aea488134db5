//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use cert_check_controller::prelude::*;
//! ```

// CRD types - most commonly used
pub use crate::crd::*;

// Reconciler types and seams
pub use crate::controller::reconciler::{
    reconcile, reconcile_cert_check, AlertSink, BackoffState, CertCheckStore, ReconcileOutcome,
    Reconciler, ReconcilerError,
};

// Pure evaluation pipeline
pub use crate::controller::aggregate::{aggregate, Aggregate, AlertReason, ExpiryAlert, NextWake};
pub use crate::controller::certificate::{extract_validity, CertificateError, Validity};
pub use crate::controller::expiry::{classify, Assessment, ExpiryState};

pub use crate::observability::metrics::MetricSink;

// Config types
pub use crate::config::{ControllerConfig, ServerConfig};
