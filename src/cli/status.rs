//! # Status Command
//!
//! Command to show the certificates tracked by a CertCheck.

use anyhow::{Context, Result};
use cert_check_controller::crd::CertCheck;
use kube::{api::Api, Client};

/// Show the spec and recorded certificates of a CertCheck
pub async fn status_command(client: Client, name: String, namespace: Option<String>) -> Result<()> {
    let ns = namespace.as_deref().unwrap_or("default");

    println!("Status for CertCheck '{ns}/{name}'");
    println!();

    let api: Api<CertCheck> = Api::namespaced(client, ns);

    let cert_check = api
        .get(&name)
        .await
        .with_context(|| format!("Failed to get CertCheck '{ns}/{name}'"))?;

    println!("Spec:");
    println!("  Threshold: {} days", cert_check.spec.threshold);
    match cert_check.label_selector() {
        Ok(selector) => {
            let rendered = selector.to_string();
            if rendered.is_empty() {
                println!("  Selector: <all secrets in namespace>");
            } else {
                println!("  Selector: {rendered}");
            }
        }
        Err(e) => println!("  Selector: invalid ({e})"),
    }

    let Some(status) = &cert_check.status else {
        println!();
        println!("Status: No status available (resource may not have been reconciled yet)");
        return Ok(());
    };

    println!();
    println!("Status:");
    println!("  Target Certificates: {}", status.target_certs_count);
    if let Some(observed_generation) = status.observed_generation {
        println!("  Observed Generation: {observed_generation}");
    }

    if !status.certificates.is_empty() {
        println!();
        println!(
            "{:<40} {:<22} {:<22} {:<6}",
            "SECRET", "NOT BEFORE", "NOT AFTER", "ACTIVE"
        );
        println!("{}", "-".repeat(92));
        for certificate in &status.certificates {
            println!(
                "{:<40} {:<22} {:<22} {:<6}",
                certificate.name, certificate.not_before, certificate.not_after, certificate.active
            );
        }
    }

    Ok(())
}
