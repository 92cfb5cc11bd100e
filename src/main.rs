#![cfg_attr(not(test), deny(clippy::panic))]

use clap::Parser;
use pulse_hub::config;
use pulse_hub::hub::{HubConfig, NotificationHub};
use pulse_hub::logging;
use pulse_hub::websocket;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::Duration;

/// Pulse Hub -- lightweight WebSocket notification hub for real-time health data sync
#[derive(Parser, Debug)]
#[command(name = "pulse-hub")]
#[command(about = "A lightweight, in-memory WebSocket notification hub for real-time health data sync")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines and pre-deployment checks.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    /// Useful for debugging configuration loading from multiple sources.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from config.json if present; otherwise use code defaults.
    let cfg = Arc::new(config::load());

    if cli.print_config {
        let json = serde_json::to_string_pretty(&*cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    // config::load() already validates but only logs to stderr; capture the
    // result here for a proper exit code and hard failure in production.
    let validation_result = config::validate_config_security(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!(
                    "  Heartbeat interval: {}s",
                    cfg.server.heartbeat_interval_secs
                );
                println!(
                    "  JWT secret configured: {}",
                    cfg.security.jwt_secret.is_some()
                );
                println!(
                    "  Metrics auth required: {}",
                    cfg.security.require_metrics_auth
                );
                println!(
                    "  Send queue capacity: {}",
                    cfg.websocket.send_queue_capacity
                );
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result?;

    logging::init_with_config(&cfg.logging);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!(%addr, "Starting Pulse Hub");

    let hub = NotificationHub::new(HubConfig {
        heartbeat_interval: Duration::from_secs(cfg.server.heartbeat_interval_secs),
        send_queue_capacity: cfg.websocket.send_queue_capacity,
        max_message_size: cfg.security.max_message_size,
        jwt_secret: cfg.security.jwt_secret.clone(),
        require_metrics_auth: cfg.security.require_metrics_auth,
        metrics_auth_token: cfg.security.metrics_auth_token.clone(),
    });

    // Start the liveness monitor
    hub.start();

    let app = websocket::create_router(&cfg.security.cors_origins).with_state(hub.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        cors_origins = %cfg.security.cors_origins,
        "Server started - WebSocket endpoint: /api/ws, Metrics: /metrics"
    );

    // On shutdown the hub must close every open connection before the server
    // can finish draining; open WebSockets would otherwise hold it up forever.
    let shutdown_hub = hub.clone();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        shutdown_hub.shutdown().await;
    })
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
