//! # powerscoutd: powerscout daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the registry source and record repository (adapters)
//! - Construct application services, injecting adapters via port traits
//! - Start the discovery scheduler
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use powerscout_adapter_http_axum::router;
use powerscout_adapter_http_axum::state::AppState;
use powerscout_adapter_registry_json::JsonRegistrySource;
use powerscout_adapter_storage_sqlite_sqlx::SqliteProvisionedRepository;
use powerscout_app::event_bus::RegistryEventBus;
use powerscout_app::scheduler::DiscoveryScheduler;
use powerscout_app::services::discovery_service::DiscoveryService;
use powerscout_app::services::provisioning_service::ProvisioningService;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let db = powerscout_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let repo = SqliteProvisionedRepository::new(db.pool().clone());

    // Registry
    let source = Arc::new(JsonRegistrySource::new(&config.registry.path));
    tracing::info!(path = %source.path().display(), "reading host registry export");

    // Services
    let provisioning = Arc::new(ProvisioningService::new(repo, Arc::clone(&source)));
    let discovery = Arc::new(DiscoveryService::new(
        source,
        Arc::clone(&provisioning),
        config.exclusions()?,
    ));

    // Event bus & scheduler
    let event_bus = Arc::new(RegistryEventBus::new(256));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = if config.discovery.enabled {
        let scheduler = DiscoveryScheduler::new(Arc::clone(&discovery), config.scheduler_config());
        Some(tokio::spawn(scheduler.run(event_bus.subscribe(), shutdown_rx)))
    } else {
        tracing::info!("background discovery disabled");
        None
    };

    // HTTP
    let state = AppState::new(provisioning, discovery, event_bus);
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "powerscoutd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if shutdown_tx.send(true).is_err() {
        tracing::debug!("discovery scheduler already stopped");
    }
    if let Some(handle) = scheduler
        && let Err(err) = handle.await
    {
        tracing::warn!(error = %err, "discovery scheduler ended abnormally");
    }
    tracing::info!("powerscoutd stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "unable to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
