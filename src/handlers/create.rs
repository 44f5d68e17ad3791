use crate::error::{parse_item_id, ApiError, ErrorResponse};
use crate::models::{Item, ItemMessageResponse, ItemRequest};
use crate::routes;
use crate::state::AppState;
use crate::store::ItemStore;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

/// POST /items/{id} handler - Create an item at an explicit id
///
/// Existing ids are never overwritten; the request is rejected instead.
#[utoipa::path(
    post,
    path = routes::ITEM,
    params(
        ("id" = i64, Path, description = "Item id")
    ),
    request_body = ItemRequest,
    responses(
        (status = 201, description = "Item created", body = ItemMessageResponse),
        (status = 400, description = "Invalid id or body, or item already exists", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn create_at_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    body: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemMessageResponse>), ApiError> {
    let id = parse_item_id(&id_str)?;
    let Json(request) = body?;

    let item = state
        .store
        .create(Some(id), request.name, request.price)
        .await?;

    tracing::info!("Created item with id: {}", item.id);
    Ok((
        StatusCode::CREATED,
        Json(ItemMessageResponse {
            message: "Item created".to_string(),
            item,
        }),
    ))
}

/// POST /items handler - Create an item with a store-assigned id
#[utoipa::path(
    post,
    path = routes::ITEMS,
    request_body = ItemRequest,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn create_handler(
    State(state): State<AppState>,
    body: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let Json(request) = body?;

    let item = state.store.create(None, request.name, request.price).await?;

    tracing::info!("Created item with assigned id: {}", item.id);
    Ok((StatusCode::CREATED, Json(item)))
}
