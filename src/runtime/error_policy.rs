//! # Error Policy
//!
//! Backoff for failed reconciliation passes and classification of watch
//! stream errors.

use crate::controller::reconciler::{BackoffState, Reconciler, ReconcilerError};
use crate::crd::CertCheck;
use crate::observability;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Requeue a failed pass with per-resource Fibonacci backoff
///
/// Backoff state is keyed by `namespace/name` so one failing CertCheck never
/// slows down another. A successful pass resets it.
pub fn handle_reconciliation_error(
    obj: Arc<CertCheck>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = obj.metadata.name.as_deref().unwrap_or("unknown");
    let namespace = obj.metadata.namespace.as_deref().unwrap_or("default");

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        resource.name = name,
        resource.namespace = namespace,
        error = %error
    );
    let _error_guard = error_span.enter();

    error!("Reconciliation error for {}/{}: {:?}", namespace, name, error);
    observability::metrics::increment_reconciliation_errors();

    let resource_key = format!("{namespace}/{name}");
    let (backoff_seconds, error_count) = match ctx.backoff_states.lock() {
        Ok(mut states) => {
            let state = states.entry(resource_key).or_insert_with(|| {
                BackoffState::new(
                    ctx.config.backoff_min_minutes,
                    ctx.config.backoff_max_minutes,
                )
            });
            state.increment_error();
            (state.backoff.next_backoff_seconds(), state.error_count)
        }
        Err(e) => {
            warn!(
                "Failed to lock backoff_states: {}, using default backoff",
                e
            );
            (ctx.config.backoff_min_minutes.saturating_mul(60), 0)
        }
    };

    info!(
        "Retrying with Fibonacci backoff: {}s (error count: {}, trigger source: error-backoff)",
        backoff_seconds, error_count
    );

    observability::metrics::increment_requeues_total("error-backoff");
    Action::requeue(Duration::from_secs(backoff_seconds))
}

/// How the watch loop should treat an error from the controller stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchErrorKind {
    /// 401: RBAC revoked or token expired
    Unauthorized,
    /// 410: resource version too old, the watcher relists
    Expired,
    /// 429: API server storage is reinitializing
    TooManyRequests,
    /// 404: CertCheck CRD missing or object deleted
    NotFound,
    Other,
}

impl WatchErrorKind {
    /// Classify a rendered controller error
    #[must_use]
    pub fn classify(error_string: &str) -> Self {
        // 404 first: a plain-text 404 body surfaces as a deserialization error inside WatchFailed
        let is_not_found = error_string.contains("ObjectNotFound")
            || error_string.contains("404")
            || error_string.contains("not found");
        if is_not_found {
            return WatchErrorKind::NotFound;
        }
        if error_string.contains("401") || error_string.contains("Unauthorized") {
            return WatchErrorKind::Unauthorized;
        }
        if error_string.contains("410")
            || error_string.contains("too old resource version")
            || error_string.contains("Gone")
        {
            return WatchErrorKind::Expired;
        }
        if error_string.contains("429")
            || error_string.contains("storage is (re)initializing")
            || error_string.contains("TooManyRequests")
        {
            return WatchErrorKind::TooManyRequests;
        }
        WatchErrorKind::Other
    }
}

/// Log a watch stream error and wait as needed before the stream continues
pub async fn handle_watch_stream_error(error_string: &str, watch_restart_delay: Duration) {
    let error_span = tracing::span!(
        tracing::Level::WARN,
        "controller.watch.error",
        error = %error_string
    );
    let _error_guard = error_span.enter();

    match WatchErrorKind::classify(error_string) {
        WatchErrorKind::Unauthorized => {
            error!("Watch authentication failed (401 Unauthorized) - RBAC may have been revoked or token expired");
            error!("Check that the ClusterRole grants get/list/watch on certchecks and secrets, and patch on secrets and certchecks/status");
            tokio::time::sleep(watch_restart_delay).await;
        }
        WatchErrorKind::Expired => {
            warn!(error_type = "410", "watch.error.resource_version_expired");
        }
        WatchErrorKind::TooManyRequests => {
            warn!(
                "API server storage reinitializing (429), backing off for {}s",
                watch_restart_delay.as_secs()
            );
            tokio::time::sleep(watch_restart_delay).await;
        }
        WatchErrorKind::NotFound => {
            warn!(
                "Resource not found (404) - the CertCheck CRD may be missing. Error: {}",
                error_string
            );
        }
        WatchErrorKind::Other => {
            error!("Controller stream error: {}", error_string);
        }
    }
}
