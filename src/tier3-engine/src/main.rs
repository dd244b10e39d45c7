//! Tier 3 Loyalty & Discount Decision Engine — POS sidecar service.
//!
//! Main entry point that loads configuration, connects to the
//! persistence store, and starts the HTTP server.

use clap::Parser;
use std::sync::Arc;
use tier3_api::ApiServer;
use tier3_core::clock::SystemClock;
use tier3_core::config::AppConfig;
use tier3_persistence::Store;
use tier3_pipeline::Pipeline;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "tier3-engine")]
#[command(about = "Tier 3 Loyalty & Discount Decision Engine")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "TIER3_ENGINE__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "TIER3_ENGINE__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Database URL (overrides config)
    #[arg(long, env = "TIER3_ENGINE__DATABASE__URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tier3_engine=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Tier 3 decision engine starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        database_url = %config.database.url,
        "configuration loaded"
    );

    let store = Store::connect(&config.database.url, config.database.max_connections).await?;

    let pipeline = Arc::new(Pipeline::new(
        store,
        Arc::new(SystemClock),
        config.engine.daily_cap,
        config.engine.default_loyalty_discount_cents,
    ));

    let api_server = ApiServer::new(config.clone(), pipeline);

    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "failed to start metrics exporter");
    }

    info!("tier3-engine is ready to serve traffic");

    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to register SIGTERM handler");
            tokio::select! {
                _ = ctrl_c => info!("received SIGINT, shutting down"),
                _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
            info!("received SIGINT, shutting down");
        }
    };

    tokio::select! {
        result = api_server.start_http() => result?,
        _ = shutdown => {}
    }

    info!("tier3-engine shut down cleanly");
    Ok(())
}
