use crate::error::{ApiError, ErrorResponse};
use crate::models::HomeResponse;
use crate::routes;
use crate::state::AppState;
use crate::store::ItemStore;
use axum::{extract::State, http::StatusCode, Json};

/// GET / handler - Welcome message plus the current items
#[utoipa::path(
    get,
    path = routes::ROOT,
    responses(
        (status = 200, description = "Welcome message and all items", body = HomeResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn home_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HomeResponse>), ApiError> {
    let items = state.store.list().await?;

    Ok((
        StatusCode::OK,
        Json(HomeResponse {
            message: "Welcome to the Item API!".to_string(),
            items,
        }),
    ))
}
