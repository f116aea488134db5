//! # Cert Check Controller
//!
//! A Kubernetes controller that watches TLS secrets and reports certificates
//! that are expired or about to expire.
//!
//! ## Overview
//!
//! 1. **Watching CertChecks** - Each `CertCheck` selects TLS secrets in its namespace and sets a warning threshold in days
//! 2. **Reading certificates** - Parses the `tls.crt` PEM of every selected `kubernetes.io/tls` secret
//! 3. **Classifying** - Expired, expiring within the threshold, or healthy
//! 4. **Reporting** - Annotates secrets, records Warning events, exports the `is_expired_certificate` gauge and writes status
//! 5. **Scheduling** - Requeues right before the earliest healthy certificate crosses its threshold
//!
//! ## Features
//!
//! - **Multi-namespace**: Watches `CertCheck` resources across all namespaces
//! - **Secret watch**: Changes to TLS secrets re-trigger the CertChecks selecting them
//! - **Prometheus metrics**: Exposes metrics for monitoring and observability
//! - **Health probes**: HTTP endpoints for liveness and readiness checks

use anyhow::Result;
use cert_check_controller::runtime::{initialize, run_watch_loop};

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialize().await?;

    run_watch_loop(
        init.client,
        init.reconciler,
        init.server_state,
        init.controller_config,
    )
    .await
}
