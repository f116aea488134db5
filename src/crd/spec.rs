//! # CertCheck Spec
//!
//! The watch policy resource: which secrets to look at and how early to warn.

use crate::crd::{CertificateSelector, SelectorError};
use kube::core::Selector;
use serde::{Deserialize, Serialize};

/// CertCheck Custom Resource Definition
///
/// Selects TLS secrets in its own namespace and reports their expiry state.
///
/// # Example
///
/// ```yaml
/// apiVersion: sre.amsy810.dev/v1beta1
/// kind: CertCheck
/// metadata:
///   name: ingress-certs
///   namespace: default
/// spec:
///   selector:
///     matchLabels:
///       app: ingress
///   threshold: 30
/// ```
#[derive(
    kube::CustomResource, Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema,
)]
#[kube(
    kind = "CertCheck",
    group = "sre.amsy810.dev",
    version = "v1beta1",
    namespaced,
    status = "crate::crd::CertCheckStatus",
    shortname = "cc",
    printcolumn = r#"{"name":"Threshold", "type":"integer", "jsonPath":".spec.threshold"}, {"name":"Targets", "type":"integer", "jsonPath":".status.targetCertsCount"}, {"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CertCheckSpec {
    /// Label selector over secrets in the CertCheck's namespace.
    /// When omitted every secret in the namespace is a candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<CertificateSelector>,
    /// Warning lead time in days. Certificates with fewer whole days left
    /// than this are reported as about to expire.
    #[serde(default)]
    pub threshold: i64,
}

impl CertCheck {
    /// The spec selector as a kube [`Selector`]; an absent selector selects everything.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] when a match expression is malformed.
    pub fn label_selector(&self) -> Result<Selector, SelectorError> {
        self.spec
            .selector
            .as_ref()
            .map_or_else(|| Ok(Selector::default()), CertificateSelector::to_selector)
    }
}
