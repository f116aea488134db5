//! # List Command
//!
//! Command to list all CertCheck resources.

use anyhow::{Context, Result};
use cert_check_controller::crd::CertCheck;
use kube::{api::Api, Client};

/// List CertCheck resources with their threshold and target count
pub async fn list_command(client: Client, namespace: Option<String>) -> Result<()> {
    let api: Api<CertCheck> = if let Some(ns) = &namespace {
        println!("Listing CertCheck resources in namespace '{ns}'...");
        Api::namespaced(client, ns)
    } else {
        println!("Listing CertCheck resources in all namespaces...");
        Api::all(client)
    };

    let cert_checks = api
        .list(&kube::api::ListParams::default())
        .await
        .context("Failed to list CertCheck resources")?;

    if cert_checks.items.is_empty() {
        println!("No CertCheck resources found.");
        return Ok(());
    }

    println!(
        "\n{:<30} {:<20} {:<10} {:<8} {:<8}",
        "NAME", "NAMESPACE", "THRESHOLD", "TARGETS", "ACTIVE"
    );
    println!("{}", "-".repeat(80));

    for cert_check in cert_checks.items {
        let name = cert_check.metadata.name.as_deref().unwrap_or("<unknown>");
        let ns = cert_check
            .metadata
            .namespace
            .as_deref()
            .unwrap_or("<unknown>");
        let threshold = cert_check.spec.threshold;

        let (targets, active) = cert_check.status.as_ref().map_or_else(
            || ("-".to_string(), "-".to_string()),
            |s| {
                let active = s.certificates.iter().filter(|c| c.active).count();
                (s.target_certs_count.to_string(), active.to_string())
            },
        );

        println!("{name:<30} {ns:<20} {threshold:<10} {targets:<8} {active:<8}");
    }

    Ok(())
}
