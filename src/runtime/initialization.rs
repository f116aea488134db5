//! # Initialization
//!
//! Controller initialization: rustls setup, tracing, metrics, server startup,
//! Kubernetes client setup and a summary of the CertChecks already present.

use crate::config::{ControllerConfig, ServerConfig};
use crate::controller::reconciler::Reconciler;
use crate::controller::server::{start_server, ServerState};
use crate::crd::CertCheck;
use crate::observability;
use anyhow::{Context, Result};
use kube::{api::Api, api::ListParams, Client};
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Initialization result containing all necessary components for the controller
pub struct InitializationResult {
    /// Kubernetes client
    pub client: Client,
    /// Reconciler context
    pub reconciler: Arc<Reconciler>,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
    pub controller_config: ControllerConfig,
    pub server_config: ServerConfig,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("server_ready", &self.server_state.is_ready.load(Ordering::Relaxed))
            .field("controller_config", &self.controller_config)
            .field("server_config", &self.server_config)
            .finish_non_exhaustive()
    }
}

/// Initialize the controller runtime
///
/// # Errors
///
/// Fails when metrics cannot be registered, the HTTP server does not come up
/// in time, or no Kubernetes client configuration is available.
pub async fn initialize() -> Result<InitializationResult> {
    // rustls 0.23 needs a process-wide crypto provider before any TLS connection
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        // Already installed by an earlier call in this process
        warn!("rustls crypto provider was already installed");
    }

    let controller_config = ControllerConfig::from_env();
    let server_config = ServerConfig::from_env();

    init_tracing(&controller_config.log_format);

    info!("Starting Cert Check Controller");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );
    info!(config = ?controller_config, "Controller configuration loaded");

    observability::metrics::register_metrics().context("Failed to register metrics")?;

    let server_state = Arc::new(ServerState::new());

    let server_state_clone = server_state.clone();
    let server_port = server_config.metrics_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });

    // Readiness probes must pass before reconciling starts
    wait_for_server_ready(&server_state, &server_handle, &server_config).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let reconciler = Arc::new(Reconciler::new(client.clone(), controller_config.clone()));

    summarize_existing_resources(&Api::<CertCheck>::all(client.clone())).await;

    info!("Controller initialized, starting watch loop...");

    Ok(InitializationResult {
        client,
        reconciler,
        server_state,
        controller_config,
        server_config,
    })
}

fn init_tracing(log_format: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cert_check_controller=info".into());

    let result = if log_format == "text" {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("Tracing subscriber already initialized: {e}");
    }
}

/// Wait for the HTTP server to become ready
async fn wait_for_server_ready(
    server_state: &Arc<ServerState>,
    server_handle: &tokio::task::JoinHandle<()>,
    server_config: &ServerConfig,
) -> Result<()> {
    let startup_timeout = server_config.startup_timeout();
    let poll_interval = server_config.poll_interval();
    let start_time = std::time::Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }

        if server_state.is_ready.load(Ordering::Relaxed) {
            info!("HTTP server is ready and accepting connections");
            break;
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }

    Ok(())
}

/// Log the CertChecks present at startup, grouped by namespace
///
/// The watch loop reconciles all of them on its initial list; this only
/// checks that the CRD is installed and gives operators a startup summary.
async fn summarize_existing_resources(cert_checks: &Api<CertCheck>) {
    let existing_resources_span = tracing::span!(
        tracing::Level::INFO,
        "controller.startup.summary",
        operation = "summarize_existing_resources"
    );
    let _guard = existing_resources_span.enter();

    match cert_checks.list(&ListParams::default()).await {
        Ok(list) => {
            if list.items.is_empty() {
                info!("No existing CertCheck resources found, watch will pick up new resources");
                return;
            }

            let mut by_namespace: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for item in &list.items {
                by_namespace
                    .entry(
                        item.metadata
                            .namespace
                            .clone()
                            .unwrap_or_else(|| "default".to_string()),
                    )
                    .or_default()
                    .push(
                        item.metadata
                            .name
                            .clone()
                            .unwrap_or_else(|| "unknown".to_string()),
                    );
            }

            info!("Cert Check Controller - Startup Resource Summary");
            info!("Resource Kind: CertCheck");
            info!("Total Resources: {}", list.items.len());
            info!("Namespaces: {}", by_namespace.len());

            for (namespace, mut names) in by_namespace {
                names.sort();
                let shown = if names.len() <= 3 {
                    names.join(", ")
                } else {
                    format!("{}, ... ({} total)", names[..3].join(", "), names.len())
                };
                info!("Namespace: {}", namespace);
                info!("  Resources ({}): {}", names.len(), shown);
            }
        }
        Err(e) => {
            error!("CRD is not queryable; {:?}. Is the CRD installed?", e);
            error!("Installation: cargo run --bin crdgen | kubectl apply -f -");
            warn!("Continuing despite CRD queryability check failure - controller will retry");
        }
    }
}
