//! # Reconcile Command
//!
//! Command to trigger reconciliation for CertCheck resources.

use anyhow::{Context, Result};
use cert_check_controller::constants::ANNOTATION_RECONCILE;
use cert_check_controller::crd::CertCheck;
use kube::{
    api::{Api, Patch, PatchParams},
    Client,
};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

/// Trigger reconciliation by adding or updating an annotation
///
/// Any change to the CertCheck is a watch event, so the controller runs a
/// pass as soon as the patch lands.
pub async fn reconcile_command(client: Client, name: String, namespace: Option<String>) -> Result<()> {
    let ns = namespace.as_deref().unwrap_or("default");
    let api: Api<CertCheck> = Api::namespaced(client, ns);

    println!("Triggering reconciliation for CertCheck '{ns}/{name}'...");

    api.get(&name)
        .await
        .with_context(|| format!("Failed to get CertCheck '{ns}/{name}'"))?;

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System time is before UNIX epoch - this should never happen")?
        .as_secs();

    let patch = json!({
        "metadata": {
            "annotations": {
                ANNOTATION_RECONCILE: timestamp.to_string()
            }
        }
    });

    api.patch(&name, &PatchParams::default(), &Patch::Merge(patch))
        .await
        .with_context(|| format!("Failed to annotate CertCheck '{ns}/{name}'"))?;

    println!("   Reconciliation triggered ({ANNOTATION_RECONCILE}={timestamp})");
    println!("   Follow progress with: certctl status {name} --namespace {ns}");

    Ok(())
}
