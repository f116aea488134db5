//! # CRD Generator
//!
//! Prints the `CertCheck` CustomResourceDefinition as YAML.
//!
//! ## Usage
//!
//! ```bash
//! # Generate CRD YAML
//! cargo run --bin crdgen > config/crd/certcheck.yaml
//!
//! # Generate and apply directly
//! cargo run --bin crdgen | kubectl apply -f -
//! ```
//!
//! The generated CRD includes the OpenAPI schema, print columns and the
//! status subresource.

use anyhow::{Context, Result};
use cert_check_controller::crd::CertCheck;
use kube::core::CustomResourceExt;

fn main() -> Result<()> {
    let yaml = serde_yaml::to_string(&CertCheck::crd()).context("Failed to serialize CRD")?;
    print!("{yaml}");
    Ok(())
}
