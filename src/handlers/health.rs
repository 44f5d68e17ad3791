use crate::error::{HealthResponse, UnhealthyResponse};
use crate::routes;
use crate::state::AppState;
use crate::store::ItemStore;
use axum::{extract::State, http::StatusCode, Json};

/// GET /health handler - Health check endpoint
///
/// Asks the item store whether it can serve requests. For Spanner this runs
/// a `SELECT 1`; the in-memory store is always healthy.
#[utoipa::path(
    get,
    path = routes::HEALTH,
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = UnhealthyResponse)
    ),
    tag = "health"
)]
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HealthResponse>), (StatusCode, Json<UnhealthyResponse>)> {
    match state.store.health_check().await {
        Ok(_) => {
            tracing::debug!("Health check passed");
            Ok((
                StatusCode::OK,
                Json(HealthResponse {
                    status: "healthy".to_string(),
                    store: state.store.backend_name().to_string(),
                }),
            ))
        }
        Err(e) => {
            tracing::error!("Health check failed: {:#}", e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(UnhealthyResponse {
                    status: "unhealthy".to_string(),
                    error: "Cannot reach the item store".to_string(),
                }),
            ))
        }
    }
}
