//! # Secret to CertCheck Mapping
//!
//! Resolves a changed TLS secret into the CertChecks that need a new pass:
//! every known CertCheck in the secret's namespace whose selector matches the
//! secret's labels, plus any whose status still lists the secret. The latter
//! catches secrets relabelled out of a selector. A malformed selector matches
//! nothing.

use crate::crd::CertCheck;
use k8s_openapi::api::core::v1::Secret;
use kube::core::SelectorExt;
use kube_runtime::reflector::ObjectRef;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// CertChecks among `known` that select `secret` or last recorded it
#[must_use]
pub fn cert_checks_for_secret(
    secret: &Secret,
    known: &[Arc<CertCheck>],
) -> Vec<ObjectRef<CertCheck>> {
    let namespace = secret.metadata.namespace.as_deref();
    let secret_name = secret.metadata.name.as_deref();
    let empty = BTreeMap::new();
    let labels = secret.metadata.labels.as_ref().unwrap_or(&empty);

    let requests: Vec<ObjectRef<CertCheck>> = known
        .iter()
        .filter(|cert_check| cert_check.metadata.namespace.as_deref() == namespace)
        .filter(|cert_check| {
            cert_check
                .label_selector()
                .is_ok_and(|selector| selector.matches(labels))
                || secret_name.is_some_and(|name| records_secret(cert_check, name))
        })
        .map(|cert_check| ObjectRef::from_obj(cert_check.as_ref()))
        .collect();

    if !requests.is_empty() {
        debug!(
            secret.name = secret.metadata.name.as_deref().unwrap_or("unknown"),
            secret.namespace = namespace.unwrap_or("unknown"),
            requests = requests.len(),
            "Secret change mapped to CertChecks"
        );
    }
    requests
}

fn records_secret(cert_check: &CertCheck, secret_name: &str) -> bool {
    cert_check.status.as_ref().is_some_and(|status| {
        status
            .certificates
            .iter()
            .any(|certificate| certificate.name == secret_name)
    })
}
