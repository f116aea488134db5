//! # CertCheck Status
//!
//! Status computed by the reconciler. It is replaced as a whole on every pass.

use serde::{Deserialize, Serialize};

/// Status of the CertCheck resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertCheckStatus {
    /// Number of TLS secrets evaluated in the last pass
    #[serde(default)]
    pub target_certs_count: usize,
    /// One entry per evaluated TLS secret, in listing order
    #[serde(default)]
    pub certificates: Vec<CertificateStatus>,
    /// Generation of the CertCheck this status was computed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// Validity snapshot of one certificate
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateStatus {
    /// Secret name
    pub name: String,
    /// Start of validity (RFC3339)
    pub not_before: String,
    /// End of validity (RFC3339)
    pub not_after: String,
    /// False once notAfter had passed at evaluation time
    pub active: bool,
}
