//! # Validation
//!
//! Spec checks run before any secret is listed.

use crate::controller::reconciler::ReconcilerError;
use crate::crd::CertCheck;
use kube::core::Selector;

/// Check the CertCheck spec and return its label selector
///
/// # Errors
///
/// [`ReconcilerError::Validation`] when the threshold is negative or the
/// selector holds a malformed match expression.
pub fn validate_cert_check(cert_check: &CertCheck) -> Result<Selector, ReconcilerError> {
    let namespace = cert_check.metadata.namespace.as_deref().unwrap_or("default");
    let name = cert_check.metadata.name.as_deref().unwrap_or("unknown");
    let invalid = |reason: String| ReconcilerError::Validation {
        namespace: namespace.to_string(),
        name: name.to_string(),
        reason,
    };

    if cert_check.spec.threshold < 0 {
        return Err(invalid(format!(
            "threshold must not be negative, got {}",
            cert_check.spec.threshold
        )));
    }

    cert_check
        .label_selector()
        .map_err(|e| invalid(e.to_string()))
}
