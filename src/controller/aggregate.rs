//! # Status Aggregation
//!
//! Folds the per-certificate assessments of one CertCheck into:
//!
//! - the status snapshot written back to the resource
//! - one alert per expired or expiring certificate
//! - one gauge sample per certificate
//! - the delay until the earliest healthy certificate enters its warning window
//!
//! Aggregation is pure. Feeding it the same evaluations twice yields the same
//! output, alerts included; nothing here remembers what was emitted before.

use crate::constants::SECONDS_PER_DAY;
use crate::controller::certificate::Validity;
use crate::controller::expiry::{Assessment, ExpiryState};
use crate::crd::{CertCheckStatus, CertificateStatus};
use chrono::SecondsFormat;
use k8s_openapi::api::core::v1::{ObjectReference, Secret};
use kube::Resource;
use std::time::Duration;

/// One TLS secret after extraction and classification
#[derive(Debug, Clone)]
pub struct EvaluatedCertificate {
    pub name: String,
    pub namespace: String,
    /// Reference to the secret, used as the subject of published events
    pub subject: ObjectReference,
    pub validity: Validity,
    pub assessment: Assessment,
}

impl EvaluatedCertificate {
    #[must_use]
    pub fn new(secret: &Secret, validity: Validity, assessment: Assessment) -> Self {
        Self {
            name: secret.metadata.name.clone().unwrap_or_default(),
            namespace: secret.metadata.namespace.clone().unwrap_or_default(),
            subject: secret.object_ref(&()),
            validity,
            assessment,
        }
    }
}

/// Why an alert was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertReason {
    Expired,
    WillBeExpired,
}

impl AlertReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AlertReason::Expired => "Expired",
            AlertReason::WillBeExpired => "WillBeExpired",
        }
    }
}

/// Warning about one certificate, published as an event on its secret
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiryAlert {
    pub subject: ObjectReference,
    pub reason: AlertReason,
    pub message: String,
}

/// Gauge sample for one certificate of one CertCheck
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub namespace: String,
    pub cert_check: String,
    pub certificate: String,
    pub value: f64,
}

/// When the CertCheck should be evaluated again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextWake {
    /// No TLS secret matched; only watch events will trigger another pass
    Unscheduled,
    /// Secrets matched but none is healthy, so there is no transition to time
    NoHealthyCertificates,
    /// Earliest healthy certificate reaches its threshold after this delay
    After(Duration),
}

/// Everything one pass produces from its evaluations
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub status: CertCheckStatus,
    pub next_wake: NextWake,
    pub alerts: Vec<ExpiryAlert>,
    pub samples: Vec<MetricSample>,
}

/// Aggregate the evaluations of the CertCheck `namespace/name`
#[must_use]
pub fn aggregate(namespace: &str, name: &str, evaluations: &[EvaluatedCertificate]) -> Aggregate {
    let certificates: Vec<CertificateStatus> = evaluations
        .iter()
        .map(|evaluation| CertificateStatus {
            name: evaluation.name.clone(),
            not_before: evaluation
                .validity
                .not_before
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            not_after: evaluation
                .validity
                .not_after
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            active: evaluation.assessment.state.is_active(),
        })
        .collect();

    let samples = evaluations
        .iter()
        .map(|evaluation| MetricSample {
            namespace: namespace.to_string(),
            cert_check: name.to_string(),
            certificate: evaluation.name.clone(),
            value: evaluation.assessment.state.gauge_value(),
        })
        .collect();

    let alerts = evaluations.iter().filter_map(alert_for).collect();

    Aggregate {
        status: CertCheckStatus {
            target_certs_count: certificates.len(),
            certificates,
            observed_generation: None,
        },
        next_wake: next_wake(evaluations),
        alerts,
        samples,
    }
}

fn alert_for(evaluation: &EvaluatedCertificate) -> Option<ExpiryAlert> {
    let (reason, verb) = match evaluation.assessment.state {
        ExpiryState::Expired => (AlertReason::Expired, "is expired"),
        ExpiryState::ExpiringSoon => (AlertReason::WillBeExpired, "will be expired"),
        ExpiryState::Healthy => return None,
    };
    Some(ExpiryAlert {
        subject: evaluation.subject.clone(),
        reason,
        message: format!(
            "TLS Secret {}/{} {verb} at {}",
            evaluation.namespace, evaluation.name, evaluation.validity.not_after
        ),
    })
}

fn next_wake(evaluations: &[EvaluatedCertificate]) -> NextWake {
    if evaluations.is_empty() {
        return NextWake::Unscheduled;
    }
    // Slack of a healthy certificate is never negative
    let min_slack = evaluations
        .iter()
        .filter(|e| e.assessment.state == ExpiryState::Healthy)
        .map(|e| e.assessment.slack_days)
        .min();
    match min_slack {
        Some(days) => {
            let seconds = u64::try_from(days.saturating_mul(SECONDS_PER_DAY)).unwrap_or(0);
            NextWake::After(Duration::from_secs(seconds))
        }
        None => NextWake::NoHealthyCertificates,
    }
}
