//! # Reconciler
//!
//! Core reconciliation logic for `CertCheck` resources.
//!
//! The reconciler:
//! - Loads the `CertCheck` and validates its threshold and selector
//! - Lists the TLS secrets it selects in its namespace
//! - Reads each certificate's validity window and classifies it
//! - Annotates the secrets, publishes gauge samples and Warning events
//! - Writes the status snapshot and schedules the next pass
//!
//! Cluster access, events and metrics go through the [`CertCheckStore`],
//! [`AlertSink`] and [`MetricSink`](crate::observability::metrics::MetricSink)
//! seams held by the [`Reconciler`] context.

pub mod alerts;
pub mod reconcile;
pub mod store;
pub mod types;
pub mod validation;

// Re-export public API
pub use alerts::{AlertSink, EventAlertSink};
pub use reconcile::{outcome_to_action, reconcile, reconcile_cert_check};
pub use store::{CertCheckStore, KubeStore};
pub use types::{BackoffState, ReconcileOutcome, Reconciler, ReconcilerError};
