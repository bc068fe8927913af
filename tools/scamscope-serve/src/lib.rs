//! HTTP front end for the ScamScope predictor.
//!
//! | Method | Path           | Purpose                               |
//! |--------|----------------|---------------------------------------|
//! | POST   | `/api/predict` | classify one incident                 |
//! | POST   | `/api/reload`  | re-read artifacts and swap them in    |
//! | GET    | `/health`      | liveness and loaded-model summary     |

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use scamscope_core::{PredictionRequest, PredictionResponse, PredictorHandle};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<PredictorHandle>,
}

impl AppState {
    pub fn new(predictor: PredictorHandle) -> Self {
        Self {
            predictor: Arc::new(predictor),
        }
    }
}

/// Every failure leaves the service as a 500 carrying `{"error": message}`.
#[derive(Debug)]
pub struct ApiError(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(PredictionResponse::error(self.0)),
        )
            .into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/predict", post(predict).fallback(method_not_allowed))
        .route("/api/reload", post(reload).fallback(method_not_allowed))
        .route("/health", get(health))
        .with_state(state)
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError(e.body_text()))?;
    debug!(?request, "predict request");

    match state.predictor.respond(&request) {
        PredictionResponse::Failure { error } => Err(ApiError(error)),
        success => Ok(Json(success)),
    }
}

async fn reload(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let handle = Arc::clone(&state.predictor);
    tokio::task::spawn_blocking(move || handle.reload())
        .await
        .map_err(|e| ApiError(e.to_string()))?
        .map_err(|e| ApiError(e.to_string()))?;
    Ok(Json(json!({ "status": "reloaded" })))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    vocabulary: usize,
    scam_types: usize,
    states: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let predictor = state.predictor.current();
    let artifacts = predictor.artifacts();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        vocabulary: artifacts.pipeline.vectorizer().len(),
        scam_types: artifacts.scam_types.len(),
        states: artifacts.states.len(),
    })
}
