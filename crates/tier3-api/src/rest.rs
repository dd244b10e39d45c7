//! REST handlers for the POS-facing transaction endpoint and the
//! operational probes, mirroring the shape of the ad-platform's own
//! bid/health endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tier3_pipeline::Pipeline;
use tracing::error;

use crate::dto::{PosTransactionRequest, PosTransactionResponse};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub node_id: String,
    pub start_time: Instant,
}

/// POST /v1/tier3/transactions — the one pipeline-facing endpoint
/// (spec.md §6).
pub async fn handle_transaction(
    State(state): State<AppState>,
    Json(request): Json<PosTransactionRequest>,
) -> Result<Json<PosTransactionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let transaction_id = request.transaction_id.clone();
    let domain_request = request.into_domain();

    match state.pipeline.run(domain_request).await {
        Ok(result) => {
            metrics::counter!("tier3.transactions.decided").increment(1);
            Ok(Json(result.into()))
        }
        Err(e) => {
            error!(error = %e, transaction_id = %transaction_id, "decision pipeline failed");
            metrics::counter!("tier3.transactions.errors").increment(1);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "decision_failed".to_string(),
                    message: e.to_string(),
                }),
            ))
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}
