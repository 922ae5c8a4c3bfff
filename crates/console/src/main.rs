//! Server Guard console daemon
//!
//! Runs the attack simulation console and the dashboard poller against
//! the configured gateway and serves both over HTTP.

use anyhow::{Context, Result};
use guard_lib::{
    health::{components, HealthRegistry},
    observability::{ConsoleMetrics, StructuredLogger},
    AttackConsole, DashboardPollerBuilder, HttpGateway,
};
use guard_console::{api, config::DaemonConfig};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const CONSOLE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = DaemonConfig::load()?;
    let endpoints = config
        .endpoint_config()
        .resolve()
        .context("failed to resolve gateway endpoints")?;
    info!(
        environment = %config.environment,
        attack = %endpoints.attack,
        dashboard = %endpoints.dashboard,
        "Console configured"
    );

    let engine_address = endpoints
        .dashboard
        .host_str()
        .map(|host| match endpoints.dashboard.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
        .unwrap_or_else(|| endpoints.dashboard.to_string());
    let attack_url = endpoints.attack.to_string();

    let gateway = Arc::new(
        HttpGateway::with_timeout(endpoints, config.request_timeout())
            .context("failed to build gateway client")?,
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::POLLER).await;
    health_registry.register(components::GATEWAY).await;
    health_registry.register(components::SIMULATOR).await;

    // Registers the global series before the first scrape
    let _metrics = ConsoleMetrics::new();

    let logger = StructuredLogger::new(&config.instance);
    logger.log_startup(CONSOLE_VERSION, &config.environment.to_string(), &attack_url);

    let console = Arc::new(
        AttackConsole::new(gateway.clone(), config.console_config())
            .with_logger(logger.clone())
            .with_health(health_registry.clone()),
    );

    let poller = DashboardPollerBuilder::new()
        .gateway(gateway)
        .engine_address(engine_address)
        .interval(config.poll_interval())
        .logger(logger.clone())
        .health(health_registry.clone())
        .build()?;
    let dashboard = poller.view();

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let poller_handle = poller.spawn(shutdown_rx);

    let app_state = Arc::new(api::AppState::new(
        health_registry.clone(),
        console.clone(),
        dashboard,
    ));
    health_registry.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            logger.log_shutdown("SIGINT received");
        }
        result = api_handle => {
            match result {
                Ok(Err(e)) => error!(error = %e, "Console API server failed"),
                Err(e) => error!(error = %e, "Console API task panicked"),
                Ok(Ok(())) => {}
            }
            logger.log_shutdown("API server exited");
        }
    }

    health_registry.set_ready(false).await;
    let _ = shutdown_tx.send(());
    console.stop().await;
    poller_handle.shutdown().await;
    info!("Shutdown complete");

    Ok(())
}
