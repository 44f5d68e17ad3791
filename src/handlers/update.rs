use crate::error::{parse_item_id, ApiError, ErrorResponse};
use crate::models::{Item, ItemMessageResponse, ItemRequest, UpdateByIndexRequest};
use crate::routes;
use crate::state::AppState;
use crate::store::ItemStore;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

/// PUT /items/{id} handler - Replace name and price of an existing item
#[utoipa::path(
    put,
    path = routes::ITEM,
    params(
        ("id" = i64, Path, description = "Item id")
    ),
    request_body = ItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ItemMessageResponse),
        (status = 400, description = "Invalid id or body", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    body: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemMessageResponse>), ApiError> {
    let id = parse_item_id(&id_str)?;
    let Json(request) = body?;

    let item = state.store.update(id, request.name, request.price).await?;

    tracing::info!("Updated item with id: {}", id);
    Ok((
        StatusCode::OK,
        Json(ItemMessageResponse {
            message: "Item updated".to_string(),
            item,
        }),
    ))
}

/// PUT /items handler - Update the item at a position in ascending id order
///
/// `index` is required; `name` and `price` are applied when present.
#[utoipa::path(
    put,
    path = routes::ITEMS,
    request_body = UpdateByIndexRequest,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 400, description = "Missing index or invalid body", body = ErrorResponse),
        (status = 404, description = "Index out of range", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn update_by_index_handler(
    State(state): State<AppState>,
    body: Result<Json<UpdateByIndexRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let Json(request) = body?;
    let index = request.index.ok_or(ApiError::MissingIndex)?;

    let item = state.store.patch_at_index(index, request.patch()).await?;

    tracing::info!("Updated item at index {} (id: {})", index, item.id);
    Ok((StatusCode::OK, Json(item)))
}
