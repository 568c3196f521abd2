use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub detector: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System health status", body = HealthResponse)
    ),
    tag = "api"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage_status = if state.storage.health_check().await {
        "ready"
    } else {
        "unavailable"
    };

    let detector_status = if state.detector.health_check().await {
        state.detector.name().to_string()
    } else {
        format!("{} (unavailable)", state.detector.name())
    };

    let status = if storage_status == "ready" { "ok" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        storage: storage_status.to_string(),
        detector: detector_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
