//! Shared fixtures for engine tests
//!
//! In-memory store, recording alert and metric sinks, and self-signed
//! certificates with chosen validity windows.

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers")]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use cert_check_controller::config::ControllerConfig;
use cert_check_controller::controller::aggregate::ExpiryAlert;
use cert_check_controller::controller::reconciler::{AlertSink, CertCheckStore, Reconciler};
use cert_check_controller::crd::{CertCheck, CertCheckSpec, CertCheckStatus, CertificateSelector};
use cert_check_controller::observability::metrics::MetricSink;
use chrono::{DateTime, Duration, TimeZone, Utc};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::core::{Selector, SelectorExt};
use rcgen::{CertificateParams, KeyPair};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const NAMESPACE: &str = "web";
pub const CERT_CHECK: &str = "ingress-certs";

/// Fixed evaluation time for reproducible passes
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

/// PEM certificate valid from `not_before` until `not_after`
pub fn pem_valid_between(not_before: DateTime<Utc>, not_after: DateTime<Utc>) -> String {
    let mut params = CertificateParams::new(vec!["example.test".to_string()]).unwrap();
    params.not_before = time::OffsetDateTime::from_unix_timestamp(not_before.timestamp()).unwrap();
    params.not_after = time::OffsetDateTime::from_unix_timestamp(not_after.timestamp()).unwrap();
    let key_pair = KeyPair::generate().unwrap();
    params.self_signed(&key_pair).unwrap().pem()
}

/// PEM certificate expiring `days` days after [`now`] (negative for the past)
pub fn pem_expiring_in_days(days: i64) -> String {
    pem_valid_between(now() - Duration::days(365), now() + Duration::days(days))
}

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

pub fn tls_secret(name: &str, secret_labels: &[(&str, &str)], pem: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(NAMESPACE.to_string()),
            labels: Some(labels(secret_labels)),
            ..ObjectMeta::default()
        },
        type_: Some("kubernetes.io/tls".to_string()),
        data: Some(BTreeMap::from([(
            "tls.crt".to_string(),
            ByteString(pem.as_bytes().to_vec()),
        )])),
        ..Secret::default()
    }
}

pub fn opaque_secret(name: &str, secret_labels: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(NAMESPACE.to_string()),
            labels: Some(labels(secret_labels)),
            ..ObjectMeta::default()
        },
        type_: Some("Opaque".to_string()),
        data: Some(BTreeMap::from([(
            "password".to_string(),
            ByteString(b"hunter2".to_vec()),
        )])),
        ..Secret::default()
    }
}

pub fn cert_check(threshold: i64, match_labels: &[(&str, &str)]) -> CertCheck {
    let selector = if match_labels.is_empty() {
        None
    } else {
        Some(CertificateSelector {
            match_labels: Some(labels(match_labels)),
            match_expressions: None,
        })
    };
    let mut cc = CertCheck::new(
        CERT_CHECK,
        CertCheckSpec {
            selector,
            threshold,
        },
    );
    cc.metadata.namespace = Some(NAMESPACE.to_string());
    cc.metadata.generation = Some(3);
    cc
}

/// In-memory cluster state
#[derive(Default)]
pub struct FakeStore {
    pub cert_checks: Mutex<BTreeMap<(String, String), CertCheck>>,
    pub secrets: Mutex<Vec<Secret>>,
    pub annotations: Mutex<BTreeMap<(String, String), BTreeMap<String, String>>>,
    pub status_writes: Mutex<Vec<CertCheckStatus>>,
    pub fail_get: AtomicBool,
    pub fail_list: AtomicBool,
    pub fail_annotate: AtomicBool,
    pub fail_status: AtomicBool,
}

impl FakeStore {
    pub fn with(cert_check: CertCheck, secrets: Vec<Secret>) -> Arc<Self> {
        let store = Self::default();
        let key = (
            cert_check.metadata.namespace.clone().unwrap_or_default(),
            cert_check.metadata.name.clone().unwrap_or_default(),
        );
        store.cert_checks.lock().unwrap().insert(key, cert_check);
        *store.secrets.lock().unwrap() = secrets;
        Arc::new(store)
    }

    pub fn status(&self) -> Option<CertCheckStatus> {
        self.cert_checks
            .lock()
            .unwrap()
            .get(&(NAMESPACE.to_string(), CERT_CHECK.to_string()))
            .and_then(|cc| cc.status.clone())
    }

    pub fn annotations_of(&self, secret: &str) -> Option<BTreeMap<String, String>> {
        self.annotations
            .lock()
            .unwrap()
            .get(&(NAMESPACE.to_string(), secret.to_string()))
            .cloned()
    }

    pub fn status_write_count(&self) -> usize {
        self.status_writes.lock().unwrap().len()
    }
}

#[async_trait]
impl CertCheckStore for FakeStore {
    async fn get_cert_check(&self, namespace: &str, name: &str) -> Result<Option<CertCheck>> {
        if self.fail_get.load(Ordering::Relaxed) {
            return Err(anyhow!("connection refused"));
        }
        Ok(self
            .cert_checks
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn list_secrets(&self, namespace: &str, selector: &Selector) -> Result<Vec<Secret>> {
        if self.fail_list.load(Ordering::Relaxed) {
            return Err(anyhow!("connection refused"));
        }
        let empty = BTreeMap::new();
        Ok(self
            .secrets
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.metadata.namespace.as_deref() == Some(namespace))
            .filter(|s| selector.matches(s.metadata.labels.as_ref().unwrap_or(&empty)))
            .cloned()
            .collect())
    }

    async fn annotate_secret(
        &self,
        namespace: &str,
        name: &str,
        annotations: &BTreeMap<String, String>,
    ) -> Result<()> {
        if self.fail_annotate.load(Ordering::Relaxed) {
            return Err(anyhow!("secrets is forbidden"));
        }
        self.annotations
            .lock()
            .unwrap()
            .entry((namespace.to_string(), name.to_string()))
            .or_default()
            .extend(annotations.clone());
        Ok(())
    }

    async fn replace_status(
        &self,
        namespace: &str,
        name: &str,
        status: &CertCheckStatus,
    ) -> Result<()> {
        if self.fail_status.load(Ordering::Relaxed) {
            return Err(anyhow!("the object has been modified"));
        }
        if let Some(cc) = self
            .cert_checks
            .lock()
            .unwrap()
            .get_mut(&(namespace.to_string(), name.to_string()))
        {
            cc.status = Some(status.clone());
        }
        self.status_writes.lock().unwrap().push(status.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingAlerts {
    pub published: Mutex<Vec<ExpiryAlert>>,
    pub fail: AtomicBool,
}

impl RecordingAlerts {
    pub fn alerts(&self) -> Vec<ExpiryAlert> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertSink for RecordingAlerts {
    async fn publish(&self, alert: &ExpiryAlert) -> Result<()> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(anyhow!("events is forbidden"));
        }
        self.published.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

/// Last value written per (namespace, certcheck, certificate)
#[derive(Default)]
pub struct RecordingMetrics {
    pub values: Mutex<BTreeMap<(String, String, String), f64>>,
}

impl RecordingMetrics {
    pub fn value(&self, certificate: &str) -> Option<f64> {
        self.values
            .lock()
            .unwrap()
            .get(&(
                NAMESPACE.to_string(),
                CERT_CHECK.to_string(),
                certificate.to_string(),
            ))
            .copied()
    }
}

impl MetricSink for RecordingMetrics {
    fn set_certificate_state(&self, namespace: &str, cert_check: &str, certificate: &str, value: f64) {
        self.values.lock().unwrap().insert(
            (
                namespace.to_string(),
                cert_check.to_string(),
                certificate.to_string(),
            ),
            value,
        );
    }
}

pub struct Harness {
    pub store: Arc<FakeStore>,
    pub alerts: Arc<RecordingAlerts>,
    pub metrics: Arc<RecordingMetrics>,
    pub ctx: Arc<Reconciler>,
}

pub fn harness(store: Arc<FakeStore>) -> Harness {
    let alerts = Arc::new(RecordingAlerts::default());
    let metrics = Arc::new(RecordingMetrics::default());
    let ctx = Arc::new(Reconciler::with_parts(
        store.clone(),
        alerts.clone(),
        metrics.clone(),
        ControllerConfig::default(),
    ));
    Harness {
        store,
        alerts,
        metrics,
        ctx,
    }
}
