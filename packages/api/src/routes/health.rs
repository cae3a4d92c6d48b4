use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::{Router, routing::get};
use serde::{Deserialize, Serialize};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(health))
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub identity: String,
}

#[tracing::instrument(name = "GET /health", skip(state))]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        storage: state.storage.name().to_string(),
        identity: state.auth.provider_name().to_string(),
    }))
}
