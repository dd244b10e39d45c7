//! HTTP server wiring: one router for the POS transaction endpoint plus
//! operational probes, and a separate Prometheus metrics listener —
//! mirroring the ad-platform API server's split between `start_http` and
//! `start_metrics`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tier3_core::config::AppConfig;
use tier3_pipeline::Pipeline;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::rest::{self, AppState};

pub struct ApiServer {
    config: AppConfig,
    pipeline: Arc<Pipeline>,
}

impl ApiServer {
    pub fn new(config: AppConfig, pipeline: Arc<Pipeline>) -> Self {
        Self { config, pipeline }
    }

    pub async fn start_http(&self) -> anyhow::Result<()> {
        let state = AppState {
            pipeline: self.pipeline.clone(),
            node_id: self.config.node_id.clone(),
            start_time: Instant::now(),
        };

        let transaction_routes = Router::new()
            .route("/v1/tier3/transactions", post(rest::handle_transaction))
            .with_state(state.clone());

        let ops_routes = Router::new()
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            .with_state(state);

        let app = Router::new()
            .merge(transaction_routes)
            .merge(ops_routes)
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);
        info!(addr = %addr, "starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        let handle = builder
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install_recorder()?;

        info!(port = self.config.metrics.port, "metrics exporter started");
        std::mem::forget(handle);
        Ok(())
    }
}
