use crate::error::{parse_item_id, ApiError, ErrorResponse};
use crate::models::{ItemMessageResponse, ItemPatch};
use crate::routes;
use crate::state::AppState;
use crate::store::ItemStore;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

/// PATCH /items/{id} handler - Update only the supplied fields
#[utoipa::path(
    patch,
    path = routes::ITEM,
    params(
        ("id" = i64, Path, description = "Item id")
    ),
    request_body = ItemPatch,
    responses(
        (status = 200, description = "Item updated", body = ItemMessageResponse),
        (status = 400, description = "Invalid id or body", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn patch_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    body: Result<Json<ItemPatch>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemMessageResponse>), ApiError> {
    let id = parse_item_id(&id_str)?;
    let Json(patch) = body?;

    let item = state.store.patch(id, patch).await?;

    tracing::info!("Patched item with id: {}", id);
    Ok((
        StatusCode::OK,
        Json(ItemMessageResponse {
            message: "Item updated".to_string(),
            item,
        }),
    ))
}
