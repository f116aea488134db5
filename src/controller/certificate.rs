//! # Certificate Validity
//!
//! Pulls the validity window out of a PEM-encoded X.509 certificate.
//!
//! Only the dates are read. The certificate chain, signature and revocation
//! state are never checked.

use chrono::{DateTime, Utc};
use thiserror::Error;
use x509_parser::prelude::*;

/// Validity window of a certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validity {
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CertificateError {
    /// No PEM block could be found in the input
    #[error("failed to decode PEM block: {0}")]
    Decode(String),
    /// A PEM block was found but it is not a well-formed X.509 certificate
    #[error("failed to parse certificate: {0}")]
    Parse(String),
}

/// Read the validity window from the first PEM block in `pem`
///
/// # Errors
///
/// [`CertificateError::Decode`] when no PEM block is present,
/// [`CertificateError::Parse`] when the block is not an X.509 certificate.
pub fn extract_validity(pem: &[u8]) -> Result<Validity, CertificateError> {
    let block = match Pem::iter_from_buffer(pem).next() {
        Some(Ok(block)) => block,
        Some(Err(e)) => return Err(CertificateError::Decode(e.to_string())),
        None => return Err(CertificateError::Decode("no PEM block found".to_string())),
    };

    let (_, cert) = X509Certificate::from_der(&block.contents)
        .map_err(|e| CertificateError::Parse(e.to_string()))?;

    let validity = cert.validity();
    Ok(Validity {
        not_before: to_utc(validity.not_before.timestamp(), "notBefore")?,
        not_after: to_utc(validity.not_after.timestamp(), "notAfter")?,
    })
}

fn to_utc(timestamp: i64, field: &str) -> Result<DateTime<Utc>, CertificateError> {
    DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| CertificateError::Parse(format!("{field} is out of range: {timestamp}")))
}
