//! # Watch Loop
//!
//! Controller watch loop over `CertCheck` resources and the TLS secrets they
//! select.

use crate::config::ControllerConfig;
use crate::constants::TLS_SECRET_TYPE;
use crate::controller::mapper::cert_checks_for_secret;
use crate::controller::reconciler::{reconcile, Reconciler};
use crate::controller::server::ServerState;
use crate::crd::CertCheck;
use crate::runtime::error_policy::{handle_reconciliation_error, handle_watch_stream_error};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::api::Api;
use kube::Client;
use kube_runtime::controller::{self, Controller};
use kube_runtime::watcher;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

/// Run the controller until a shutdown signal arrives
///
/// CertCheck changes trigger a pass directly. TLS secret changes are mapped to
/// the CertChecks selecting them. The controller stream is restarted when it
/// ends for any reason other than shutdown.
///
/// # Errors
///
/// Currently infallible; the signature leaves room for setup failures.
pub async fn run_watch_loop(
    client: Client,
    reconciler: Arc<Reconciler>,
    server_state: Arc<ServerState>,
    config: ControllerConfig,
) -> Result<(), anyhow::Error> {
    info!("Starting controller watch loop...");

    // Mark the server as not ready once SIGTERM/SIGINT arrives
    let shutdown_server_state = server_state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal (SIGINT/SIGTERM), initiating graceful shutdown...");
            shutdown_server_state.is_ready.store(false, Ordering::Relaxed);
        }
    });

    let restart_delay = config.watch_restart_delay();

    loop {
        if !server_state.is_ready.load(Ordering::Relaxed) {
            info!("Shutdown requested, exiting watch loop");
            break;
        }

        let watch_span = tracing::span!(
            tracing::Level::INFO,
            "controller.watch",
            operation = "watch_loop"
        );

        let cert_checks: Api<CertCheck> = Api::all(client.clone());
        let secrets: Api<Secret> = Api::all(client.clone());

        let certcheck_controller =
            Controller::new(cert_checks, watcher::Config::default().any_semantic());
        let store = certcheck_controller.store();

        certcheck_controller
            .watches(
                secrets,
                watcher::Config::default().fields(&format!("type={TLS_SECRET_TYPE}")),
                move |secret| cert_checks_for_secret(&secret, &store.state()),
            )
            .with_config(
                controller::Config::default().concurrency(config.max_concurrent_reconciliations),
            )
            .shutdown_on_signal()
            .run(reconcile, handle_reconciliation_error, reconciler.clone())
            .for_each(|result| async move {
                match result {
                    Ok((obj_ref, action)) => {
                        debug!(resource = %obj_ref, action = ?action, "watch.event.reconciled");
                    }
                    // Already logged and backed off by the error policy
                    Err(controller::Error::ReconcilerFailed(_, obj_ref)) => {
                        debug!(resource = %obj_ref, "watch.event.reconciliation_failed");
                    }
                    Err(e) => {
                        handle_watch_stream_error(&format!("{e:?}"), restart_delay).await;
                    }
                }
            })
            .instrument(watch_span)
            .await;

        if !server_state.is_ready.load(Ordering::Relaxed) {
            info!("Shutdown requested, exiting watch loop");
            break;
        }

        warn!(
            "Controller watch stream ended, restarting in {} seconds...",
            restart_delay.as_secs()
        );
        tokio::time::sleep(restart_delay).await;
    }

    info!("Controller stopped gracefully");
    Ok(())
}
