//! ConfigMap Synchronization Controller
//!
//! Watches one source ConfigMap and replicates its data field to a static
//! list of target ConfigMaps, each potentially in a different namespace.

use anyhow::{Context, Result};
use kube::Client;
use std::sync::Arc;
use std::time::Duration;
use syncer_lib::{
    backoff::Backoff,
    controller::SyncController,
    health::{components, HealthRegistry},
    observability::{SyncLogger, SyncerMetrics},
    sync::{KubePatcher, SyncEngine},
    watch::{KubeWatcher, WatchConfig},
};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const SYNCER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting ConfigMap synchronization controller");

    // Load configuration
    let config = config::SyncerConfig::load()?;
    let replication = config.replication()?;
    info!(
        source = %replication.source,
        targets = replication.targets.len(),
        "Controller configured"
    );

    // Startup is the only non-recoverable failure: without a client there
    // is no loop to enter.
    let client = Client::try_default().await.context(
        "Failed to initialize Kubernetes client (in-cluster config or kubeconfig required)",
    )?;
    info!("Kubernetes client initialized");

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::WATCHER).await;
    health_registry.register(components::SYNC_ENGINE).await;

    // Initialize metrics and the structured logger
    let metrics = SyncerMetrics::new();
    let logger = SyncLogger::new(replication.source.to_string());
    logger.log_startup(SYNCER_VERSION);

    // Create shared application state
    let app_state = Arc::new(api::AppState::new(health_registry.clone(), metrics.clone()));

    let watcher = Arc::new(KubeWatcher::new(
        client.clone(),
        &replication.source,
        WatchConfig {
            timeout_secs: config.watch_timeout_secs,
        },
    ));
    let engine = SyncEngine::new(
        Arc::new(KubePatcher::new(client)),
        replication.targets.clone(),
    );
    let backoff = Backoff::new(
        Duration::from_secs(config.backoff_initial_secs),
        Duration::from_secs(config.backoff_max_secs),
    );

    let controller = SyncController::new(
        watcher,
        engine,
        backoff,
        replication,
        logger.clone(),
        metrics.clone(),
        health_registry.clone(),
    );

    // Mark ready once bootstrap succeeded
    health_registry.set_ready(true).await;

    // Start health and metrics server, then the control loop
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));
    let controller_handle = tokio::spawn(controller.run(shutdown_rx));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");

    let _ = shutdown_tx.send(());
    let _ = controller_handle.await;
    api_handle.abort();

    Ok(())
}
