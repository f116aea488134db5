//! # Inspect Command
//!
//! Classifies a local PEM certificate with the controller's rules.

use anyhow::{Context, Result};
use cert_check_controller::controller::certificate::extract_validity;
use cert_check_controller::controller::expiry::classify;
use chrono::Utc;
use std::path::Path;

pub fn inspect_command(file: &Path, threshold: i64) -> Result<()> {
    if threshold < 0 {
        anyhow::bail!("threshold must not be negative, got {threshold}");
    }

    let pem = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let validity = extract_validity(&pem)
        .with_context(|| format!("Failed to read certificate from {}", file.display()))?;
    let assessment = classify(validity.not_after, Utc::now(), threshold);

    println!("Certificate: {}", file.display());
    println!("  Not Before: {}", validity.not_before);
    println!("  Not After: {}", validity.not_after);
    println!("  Remaining Days: {}", assessment.remaining_days);
    println!("  Threshold: {threshold} days");
    println!("  State: {}", assessment.state.as_str());
    println!("  Active: {}", assessment.state.is_active());

    Ok(())
}
