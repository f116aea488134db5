//! # Reconcile
//!
//! One reconciliation pass for one CertCheck:
//!
//! 1. Load the CertCheck (gone means nothing to do)
//! 2. Validate threshold and selector
//! 3. List the selected secrets and evaluate every TLS secret among them
//! 4. Publish gauge samples and warning events
//! 5. Persist the status snapshot in one write
//! 6. Schedule the next pass from the earliest healthy certificate
//!
//! A certificate that cannot be read aborts the pass before anything is
//! persisted. Annotation and event failures are logged and the pass goes on.

use crate::constants::{
    ANNOTATION_ACTIVE, ANNOTATION_NOT_AFTER, ANNOTATION_NOT_BEFORE, TLS_CERT_KEY, TLS_SECRET_TYPE,
};
use crate::controller::aggregate::{aggregate, EvaluatedCertificate, NextWake};
use crate::controller::certificate::{extract_validity, Validity};
use crate::controller::expiry::classify;
use crate::controller::reconciler::validation::validate_cert_check;
use crate::controller::reconciler::{ReconcileOutcome, Reconciler, ReconcilerError};
use crate::crd::CertCheck;
use crate::observability::metrics;
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Secret;
use kube_runtime::controller::Action;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};

/// Entry point used by the controller runtime
///
/// # Errors
///
/// Propagates [`ReconcilerError`] so the error policy can back off.
pub async fn reconcile(
    obj: Arc<CertCheck>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let name = obj.metadata.name.as_deref().unwrap_or("unknown").to_string();
    let namespace = obj
        .metadata
        .namespace
        .as_deref()
        .unwrap_or("default")
        .to_string();

    let span = tracing::info_span!(
        "reconcile",
        resource.name = name.as_str(),
        resource.namespace = namespace.as_str(),
        resource.generation = obj.metadata.generation.unwrap_or(0),
    );

    async move {
        metrics::increment_reconciliations();
        let started = Instant::now();

        let result = reconcile_cert_check(&ctx, &namespace, &name, Utc::now()).await;
        metrics::observe_reconciliation_duration(started.elapsed().as_secs_f64());

        let outcome = result?;
        if outcome == ReconcileOutcome::NotFound {
            ctx.forget_backoff(&namespace, &name);
        } else {
            ctx.reset_backoff(&namespace, &name);
        }

        let action = outcome_to_action(outcome, &ctx);
        debug!(outcome = outcome.as_str(), action = ?action, "reconciliation.success");
        Ok(action)
    }
    .instrument(span)
    .await
}

/// Turn a pass outcome into a requeue request
#[must_use]
pub fn outcome_to_action(outcome: ReconcileOutcome, ctx: &Reconciler) -> Action {
    match outcome {
        ReconcileOutcome::NotFound | ReconcileOutcome::NoTargets => Action::await_change(),
        ReconcileOutcome::NoHealthyCertificates => {
            metrics::increment_requeues_total(outcome.as_str());
            Action::requeue(ctx.config.resync_interval())
        }
        ReconcileOutcome::RequeueAfter(delay) => {
            let clamped = ctx.config.clamp_requeue(delay);
            let next_reconcile = Utc::now()
                + chrono::Duration::from_std(clamped).unwrap_or_else(|_| chrono::Duration::zero());
            info!(
                requested_secs = delay.as_secs(),
                requeue_secs = clamped.as_secs(),
                next_reconcile = %next_reconcile.to_rfc3339(),
                "Scheduling next pass before the earliest certificate reaches its threshold"
            );
            metrics::increment_requeues_total(outcome.as_str());
            Action::requeue(clamped)
        }
    }
}

/// Run one pass for `namespace/name`, classifying against `now`
///
/// # Errors
///
/// - [`ReconcilerError::Store`] when the CertCheck or its secrets cannot be read
/// - [`ReconcilerError::Validation`] for a negative threshold or malformed selector
/// - [`ReconcilerError::Certificate`] when a TLS secret holds no readable certificate
/// - [`ReconcilerError::PersistStatus`] when the status write fails
pub async fn reconcile_cert_check(
    ctx: &Reconciler,
    namespace: &str,
    name: &str,
    now: DateTime<Utc>,
) -> Result<ReconcileOutcome, ReconcilerError> {
    let Some(cert_check) = ctx
        .store
        .get_cert_check(namespace, name)
        .await
        .map_err(|source| ReconcilerError::Store {
            operation: format!("get CertCheck {namespace}/{name}"),
            source,
        })?
    else {
        info!("CertCheck {}/{} not found, nothing to do", namespace, name);
        return Ok(ReconcileOutcome::NotFound);
    };

    let selector = validate_cert_check(&cert_check)?;
    let threshold = cert_check.spec.threshold;

    let secrets = ctx
        .store
        .list_secrets(namespace, &selector)
        .await
        .map_err(|source| ReconcilerError::Store {
            operation: format!("list secrets for CertCheck {namespace}/{name}"),
            source,
        })?;
    debug!(selected = secrets.len(), selector = %selector, "Listed candidate secrets");

    let mut evaluations = Vec::new();
    for secret in secrets.iter().filter(|s| is_tls_secret(s)) {
        let evaluation = evaluate_secret(secret, now, threshold)?;
        debug!(
            secret = evaluation.name.as_str(),
            state = evaluation.assessment.state.as_str(),
            remaining_days = evaluation.assessment.remaining_days,
            not_after = %evaluation.validity.not_after,
            "Classified certificate"
        );
        write_annotations(ctx, &evaluation).await;
        evaluations.push(evaluation);
    }
    metrics::increment_certificates_evaluated(evaluations.len() as u64);

    let mut result = aggregate(namespace, name, &evaluations);

    for sample in &result.samples {
        ctx.metrics.set_certificate_state(
            &sample.namespace,
            &sample.cert_check,
            &sample.certificate,
            sample.value,
        );
    }
    for alert in &result.alerts {
        warn!(reason = alert.reason.as_str(), "{}", alert.message);
        if let Err(e) = ctx.alerts.publish(alert).await {
            warn!(
                reason = alert.reason.as_str(),
                error = %e,
                "Failed to publish expiry event"
            );
        }
    }

    result.status.observed_generation = cert_check.metadata.generation;
    ctx.store
        .replace_status(namespace, name, &result.status)
        .await
        .map_err(|source| ReconcilerError::PersistStatus {
            namespace: namespace.to_string(),
            name: name.to_string(),
            source,
        })?;

    let outcome = match result.next_wake {
        NextWake::Unscheduled => {
            info!(
                "No TLS secrets selected by CertCheck {}/{}, waiting for changes",
                namespace, name
            );
            ReconcileOutcome::NoTargets
        }
        NextWake::NoHealthyCertificates => {
            info!(
                targets = result.status.target_certs_count,
                "No healthy certificates left for CertCheck {}/{}", namespace, name
            );
            ReconcileOutcome::NoHealthyCertificates
        }
        NextWake::After(delay) => ReconcileOutcome::RequeueAfter(delay),
    };
    Ok(outcome)
}

fn is_tls_secret(secret: &Secret) -> bool {
    secret.type_.as_deref() == Some(TLS_SECRET_TYPE)
}

fn evaluate_secret(
    secret: &Secret,
    now: DateTime<Utc>,
    threshold: i64,
) -> Result<EvaluatedCertificate, ReconcilerError> {
    let pem = secret
        .data
        .as_ref()
        .and_then(|data| data.get(TLS_CERT_KEY))
        .map(|bytes| bytes.0.as_slice())
        .unwrap_or_default();

    let validity = extract_validity(pem).map_err(|source| ReconcilerError::Certificate {
        namespace: secret.metadata.namespace.clone().unwrap_or_default(),
        name: secret.metadata.name.clone().unwrap_or_default(),
        source,
    })?;
    let assessment = classify(validity.not_after, now, threshold);

    Ok(EvaluatedCertificate::new(secret, validity, assessment))
}

/// Annotations recorded on an evaluated secret
#[must_use]
pub fn certificate_annotations(validity: &Validity, active: bool) -> BTreeMap<String, String> {
    BTreeMap::from([
        (ANNOTATION_ACTIVE.to_string(), active.to_string()),
        (
            ANNOTATION_NOT_BEFORE.to_string(),
            validity.not_before.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ),
        (
            ANNOTATION_NOT_AFTER.to_string(),
            validity.not_after.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ),
    ])
}

async fn write_annotations(ctx: &Reconciler, evaluation: &EvaluatedCertificate) {
    let annotations =
        certificate_annotations(&evaluation.validity, evaluation.assessment.state.is_active());
    if let Err(e) = ctx
        .store
        .annotate_secret(&evaluation.namespace, &evaluation.name, &annotations)
        .await
    {
        warn!(
            secret = evaluation.name.as_str(),
            error = %e,
            "Failed to annotate secret {}/{}", evaluation.namespace, evaluation.name
        );
    }
}
