//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `certcheck_reconciliations_total` - Total number of reconciliation passes
//! - `certcheck_reconciliation_errors_total` - Total number of failed passes
//! - `certcheck_reconciliation_duration_seconds` - Duration of reconciliation passes
//! - `certcheck_certificates_evaluated_total` - Total number of TLS certificates classified
//! - `certcheck_requeues_total` - Requeues scheduled, by reason
//! - `is_expired_certificate` - Per-certificate state: 1 expired, 0.5 expiring soon, 0 healthy

use crate::constants::CERTIFICATE_GAUGE_NAME;
use anyhow::Result;
use prometheus::{GaugeVec, Histogram, IntCounter, IntCounterVec, Registry};
use std::sync::LazyLock;

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "certcheck_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "certcheck_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "certcheck_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static CERTIFICATES_EVALUATED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "certcheck_certificates_evaluated_total",
        "Total number of TLS certificates classified",
    )
    .expect("Failed to create CERTIFICATES_EVALUATED_TOTAL metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "certcheck_requeues_total",
            "Total number of requeues scheduled, by reason",
        ),
        &["reason"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

static CERTIFICATE_STATE: LazyLock<GaugeVec> = LazyLock::new(|| {
    GaugeVec::new(
        prometheus::Opts::new(
            CERTIFICATE_GAUGE_NAME,
            "Certificate state: 1 expired, 0.5 expiring within threshold, 0 healthy",
        ),
        &["namespace", "certcheck", "certificate"],
    )
    .expect("Failed to create CERTIFICATE_STATE metric - this should never happen")
});

#[allow(
    clippy::missing_errors_doc,
    reason = "Fails only when a metric is registered twice"
)]
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(CERTIFICATES_EVALUATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CERTIFICATE_STATE.clone()))?;

    Ok(())
}

/// Everything registered so far, for the `/metrics` endpoint
pub fn gather() -> Vec<prometheus::proto::MetricFamily> {
    REGISTRY.gather()
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_certificates_evaluated(count: u64) {
    CERTIFICATES_EVALUATED_TOTAL.inc_by(count);
}

pub fn increment_requeues_total(reason: &str) {
    REQUEUES_TOTAL.with_label_values(&[reason]).inc();
}

/// Destination for per-certificate state samples
///
/// The engine publishes through this seam so tests can record samples
/// without touching the process registry.
pub trait MetricSink: Send + Sync {
    fn set_certificate_state(&self, namespace: &str, cert_check: &str, certificate: &str, value: f64);
}

/// Writes samples to the `is_expired_certificate` gauge in [`REGISTRY`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusMetricSink;

impl MetricSink for PrometheusMetricSink {
    fn set_certificate_state(&self, namespace: &str, cert_check: &str, certificate: &str, value: f64) {
        CERTIFICATE_STATE
            .with_label_values(&[namespace, cert_check, certificate])
            .set(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_reconciliations() {
        let before = RECONCILIATIONS_TOTAL.get();
        increment_reconciliations();
        let after = RECONCILIATIONS_TOTAL.get();
        assert_eq!(after, before + 1u64);
    }

    #[test]
    fn test_increment_reconciliation_errors() {
        let before = RECONCILIATION_ERRORS_TOTAL.get();
        increment_reconciliation_errors();
        let after = RECONCILIATION_ERRORS_TOTAL.get();
        assert_eq!(after, before + 1u64);
    }

    #[test]
    fn test_observe_reconciliation_duration() {
        let before = RECONCILIATION_DURATION.get_sample_count();
        observe_reconciliation_duration(0.25);
        assert_eq!(RECONCILIATION_DURATION.get_sample_count(), before + 1);
    }

    #[test]
    fn test_increment_certificates_evaluated() {
        let before = CERTIFICATES_EVALUATED_TOTAL.get();
        increment_certificates_evaluated(3);
        let after = CERTIFICATES_EVALUATED_TOTAL.get();
        assert_eq!(after, before + 3u64);
    }

    #[test]
    fn test_increment_requeues_total_by_reason() {
        let before = REQUEUES_TOTAL.with_label_values(&["error-backoff"]).get();
        increment_requeues_total("error-backoff");
        let after = REQUEUES_TOTAL.with_label_values(&["error-backoff"]).get();
        assert_eq!(after, before + 1u64);
    }

    #[test]
    fn test_prometheus_sink_sets_gauge() {
        let sink = PrometheusMetricSink;
        sink.set_certificate_state("metrics-test", "check", "expired", 1.0);
        sink.set_certificate_state("metrics-test", "check", "soon", 0.5);
        let expired = CERTIFICATE_STATE
            .with_label_values(&["metrics-test", "check", "expired"])
            .get();
        let soon = CERTIFICATE_STATE
            .with_label_values(&["metrics-test", "check", "soon"])
            .get();
        assert!((expired - 1.0).abs() < f64::EPSILON);
        assert!((soon - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_prometheus_sink_overwrites_previous_value() {
        let sink = PrometheusMetricSink;
        sink.set_certificate_state("metrics-test", "check", "renewed", 1.0);
        sink.set_certificate_state("metrics-test", "check", "renewed", 0.0);
        let value = CERTIFICATE_STATE
            .with_label_values(&["metrics-test", "check", "renewed"])
            .get();
        assert!(value.abs() < f64::EPSILON);
    }
}
