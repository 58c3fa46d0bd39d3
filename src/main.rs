//! namespace-guard - Kubernetes authorization webhook for protected namespaces.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Parses and validates configuration
//! - Starts the health server and the webhook server
//! - Handles graceful shutdown

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use namespace_guard::health::{HealthState, run_health_server};
use namespace_guard::{Config, PolicyEngine, WebhookState, run_webhook_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("namespace_guard=info".parse()?),
        )
        .json()
        .init();

    let config = Config::parse();
    config.validate()?;

    let policy = config.policy();
    info!(
        protected_namespaces = ?policy.protected_namespaces,
        additional_privileged_users = ?policy.additional_privileged_users,
        opinion_mode = policy.opinion_mode,
        verbosity = config.verbosity,
        "Starting namespace-guard"
    );

    let health_state = Arc::new(HealthState::new());

    // Probes should answer before the webhook is bound
    let health_handle = {
        let health_state = health_state.clone();
        let port = config.health_port;
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state, port).await {
                error!("Health server error: {}", e);
            }
        })
    };

    let webhook_handle = {
        let state = Arc::new(WebhookState::new(
            PolicyEngine::new(policy),
            health_state.clone(),
            config.verbosity(),
        ));
        let port = config.port;
        let tls = config.tls();
        if tls.is_some() {
            info!("TLS certificate configured, serving over TLS");
        }
        tokio::spawn(async move {
            if let Err(e) = run_webhook_server(state, port, tls).await {
                error!("Webhook server error: {}", e);
            }
        })
    };

    tokio::select! {
        result = webhook_handle => {
            if let Err(e) = result {
                error!("Webhook server task panicked: {}", e);
            }
        }
        result = health_handle => {
            if let Err(e) = result {
                error!("Health server task panicked: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Received shutdown signal, shutting down");
            health_state.set_ready(false).await;
        }
    }

    info!("namespace-guard stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Signal handler setup failures are fatal at startup.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
