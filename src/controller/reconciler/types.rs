//! # Types
//!
//! Core types for the reconciler.

use crate::config::ControllerConfig;
use crate::controller::backoff::FibonacciBackoff;
use crate::controller::certificate::CertificateError;
use crate::controller::reconciler::alerts::{AlertSink, EventAlertSink};
use crate::controller::reconciler::store::{CertCheckStore, KubeStore};
use crate::observability::metrics::{MetricSink, PrometheusMetricSink};
use kube::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    /// Loading the CertCheck or listing its secrets failed
    #[error("failed to {operation}: {source}")]
    Store {
        operation: String,
        #[source]
        source: anyhow::Error,
    },
    /// A selected TLS secret does not hold a readable certificate
    #[error("invalid certificate in secret {namespace}/{name}: {source}")]
    Certificate {
        namespace: String,
        name: String,
        #[source]
        source: CertificateError,
    },
    #[error("invalid CertCheck {namespace}/{name}: {reason}")]
    Validation {
        namespace: String,
        name: String,
        reason: String,
    },
    #[error("failed to persist status of CertCheck {namespace}/{name}: {source}")]
    PersistStatus {
        namespace: String,
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Result of a successful reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The CertCheck no longer exists
    NotFound,
    /// No TLS secret matched; nothing to schedule
    NoTargets,
    /// TLS secrets matched but none is healthy
    NoHealthyCertificates,
    /// Earliest healthy certificate enters its warning window after this delay
    RequeueAfter(Duration),
}

impl ReconcileOutcome {
    /// Label used for logs and the requeue counter
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::NotFound => "not-found",
            ReconcileOutcome::NoTargets => "no-targets",
            ReconcileOutcome::NoHealthyCertificates => "no-healthy-certificates",
            ReconcileOutcome::RequeueAfter(_) => "next-expiry",
        }
    }
}

/// Backoff state for a specific resource
/// Tracks error count and backoff calculator for progressive retries
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            backoff: FibonacciBackoff::new(min_minutes, max_minutes),
            error_count: 0,
        }
    }

    pub fn increment_error(&mut self) {
        self.error_count = self.error_count.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.error_count = 0;
        self.backoff.reset();
    }
}

/// Shared context handed to every reconciliation pass
#[derive(Clone)]
pub struct Reconciler {
    pub store: Arc<dyn CertCheckStore>,
    pub alerts: Arc<dyn AlertSink>,
    pub metrics: Arc<dyn MetricSink>,
    pub config: ControllerConfig,
    // Backoff state per resource (identified by namespace/name), owned by the error policy
    pub backoff_states: Arc<Mutex<HashMap<String, BackoffState>>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Context backed by the cluster: kube API store, event recorder, process registry gauge
    #[must_use]
    pub fn new(client: Client, config: ControllerConfig) -> Self {
        Self::with_parts(
            Arc::new(KubeStore::new(client.clone())),
            Arc::new(EventAlertSink::new(client)),
            Arc::new(PrometheusMetricSink),
            config,
        )
    }

    #[must_use]
    pub fn with_parts(
        store: Arc<dyn CertCheckStore>,
        alerts: Arc<dyn AlertSink>,
        metrics: Arc<dyn MetricSink>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            store,
            alerts,
            metrics,
            config,
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Forget the error history of `namespace/name` after a successful pass
    pub fn reset_backoff(&self, namespace: &str, name: &str) {
        let resource_key = format!("{namespace}/{name}");
        match self.backoff_states.lock() {
            Ok(mut states) => {
                if let Some(state) = states.get_mut(&resource_key) {
                    state.reset();
                }
            }
            Err(e) => {
                tracing::warn!("Failed to lock backoff_states: {}", e);
            }
        }
    }

    /// Drop the error history of a deleted `namespace/name`
    pub fn forget_backoff(&self, namespace: &str, name: &str) {
        let resource_key = format!("{namespace}/{name}");
        match self.backoff_states.lock() {
            Ok(mut states) => {
                states.remove(&resource_key);
            }
            Err(e) => {
                tracing::warn!("Failed to lock backoff_states: {}", e);
            }
        }
    }
}
