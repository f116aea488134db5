//! # CERTCTL CLI
//!
//! Command-line interface for the Cert Check Controller.
//!
//! ## Usage
//!
//! ```bash
//! # List all CertCheck resources
//! certctl list
//!
//! # Show the certificates tracked by a CertCheck
//! certctl status ingress-certs --namespace web
//!
//! # Trigger reconciliation for a CertCheck
//! certctl reconcile ingress-certs --namespace web
//!
//! # Classify a local PEM file without a cluster
//! certctl inspect ./tls.crt --threshold 30
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kube::Client;
use std::path::PathBuf;

mod inspect;
mod list;
mod reconcile;
mod status;

/// Cert Check Controller CLI
#[derive(Parser)]
#[command(name = "certctl")]
#[command(
    about = "Cert Check Controller CLI",
    long_about = None,
    after_help = "\
Examples:
  certctl list
  certctl status ingress-certs --namespace web
  certctl reconcile ingress-certs -n web
  certctl inspect ./tls.crt --threshold 30
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Kubernetes namespace (defaults to "default"; `list` spans all namespaces when omitted)
    #[arg(short, long, global = true)]
    namespace: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List CertCheck resources and how many certificates each tracks
    List,
    /// Show the certificates recorded in a CertCheck's status
    Status {
        /// Name of the CertCheck resource
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Trigger reconciliation for a CertCheck resource
    Reconcile {
        /// Name of the CertCheck resource
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Classify a local PEM certificate the way the controller would
    Inspect {
        /// Path to a PEM file; only the first certificate is read
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Warning threshold in days
        #[arg(short, long, default_value_t = 0)]
        threshold: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Offline command, no cluster access needed
        Commands::Inspect { file, threshold } => inspect::inspect_command(&file, threshold),
        Commands::List => list::list_command(connect().await?, cli.namespace).await,
        Commands::Status { name } => {
            status::status_command(connect().await?, name, cli.namespace).await
        }
        Commands::Reconcile { name } => {
            reconcile::reconcile_command(connect().await?, name, cli.namespace).await
        }
    }
}

/// Install the crypto provider and logging, then build a client from kubeconfig
async fn connect() -> Result<Client> {
    // rustls 0.23 needs a process-wide crypto provider before the client connects
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider was already installed");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "certctl=info".into()),
        )
        .init();

    Client::try_default()
        .await
        .context("Failed to create Kubernetes client. Ensure kubeconfig is configured.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_parses_file_and_threshold() {
        let cli = Cli::try_parse_from(["certctl", "inspect", "./tls.crt", "--threshold", "30"])
            .unwrap();
        match cli.command {
            Commands::Inspect { file, threshold } => {
                assert_eq!(file, PathBuf::from("./tls.crt"));
                assert_eq!(threshold, 30);
            }
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn test_inspect_runs_without_cluster() {
        let cli = Cli::try_parse_from(["certctl", "inspect", "/nonexistent/tls.crt"]).unwrap();
        let Commands::Inspect { file, threshold } = cli.command else {
            panic!("expected inspect");
        };
        // Fails on the missing file, never on kubeconfig
        let err = inspect::inspect_command(&file, threshold).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Failed to read /nonexistent/tls.crt"), "{message}");
        assert!(!message.contains("kubeconfig"));
    }

    #[test]
    fn test_namespace_is_global() {
        let cli = Cli::try_parse_from(["certctl", "status", "ingress-certs", "-n", "web"]).unwrap();
        assert_eq!(cli.namespace.as_deref(), Some("web"));
        assert!(matches!(cli.command, Commands::Status { name } if name == "ingress-certs"));
    }
}
