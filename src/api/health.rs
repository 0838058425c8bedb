use axum::response::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" when the service is up
    pub status: &'static str,
    /// Service identifier for platform probes
    pub service: &'static str,
}

/// Service liveness probe
///
/// Excluded from rate limiting so platform health checks never starve.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    ),
    tag = "Service"
)]
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "token-renderer",
    })
}
