use crate::error::{parse_item_id, ApiError, ErrorResponse};
use crate::models::ItemResponse;
use crate::routes;
use crate::state::AppState;
use crate::store::ItemStore;
use axum::{extract::Path, extract::State, http::StatusCode, Json};

/// GET /items/{id} handler - Retrieve a single item
#[utoipa::path(
    get,
    path = routes::ITEM,
    params(
        ("id" = i64, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item found", body = ItemResponse),
        (status = 400, description = "Invalid item id", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let id = parse_item_id(&id_str)?;

    match state.store.get(id).await? {
        Some(item) => {
            tracing::info!("Successfully retrieved item with id: {}", id);
            Ok((StatusCode::OK, Json(ItemResponse { item })))
        }
        None => {
            tracing::info!("Item not found with id: {}", id);
            Err(ApiError::ItemNotFound)
        }
    }
}

/// HEAD /items/{id} handler - Existence check with an empty body
#[utoipa::path(
    head,
    path = routes::ITEM,
    params(
        ("id" = i64, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item exists"),
        (status = 400, description = "Invalid item id"),
        (status = 404, description = "Item not found")
    ),
    tag = "items"
)]
pub async fn head_handler(State(state): State<AppState>, Path(id_str): Path<String>) -> StatusCode {
    let Ok(id) = parse_item_id(&id_str) else {
        return StatusCode::BAD_REQUEST;
    };

    match state.store.get(id).await {
        Ok(Some(_)) => StatusCode::OK,
        Ok(None) => StatusCode::NOT_FOUND,
        Err(e) => {
            tracing::error!("HEAD lookup for item {} failed: {:#}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{empty_app, read_bytes, read_json, sample_app, send};
    use crate::models::Item;

    #[tokio::test]
    async fn test_get_endpoint_success() {
        let app = sample_app();

        let response = send(&app, "GET", "/items/1", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response_json: ItemResponse = read_json(response).await;
        assert_eq!(
            response_json.item,
            Item {
                id: 1,
                name: "Apple".to_string(),
                price: 1.99
            }
        );
    }

    #[tokio::test]
    async fn test_get_endpoint_not_found() {
        let app = empty_app();

        let response = send(&app, "GET", "/items/999", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let error_response: ErrorResponse = read_json(response).await;
        assert_eq!(error_response.error, "Item not found");
    }

    #[tokio::test]
    async fn test_get_endpoint_invalid_id() {
        let app = empty_app();

        let response = send(&app, "GET", "/items/not-a-number", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error_response: ErrorResponse = read_json(response).await;
        assert!(error_response.error.contains("Invalid item id"));
    }

    #[tokio::test]
    async fn test_head_endpoint() {
        let app = sample_app();

        let response = send(&app, "HEAD", "/items/2", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(read_bytes(response).await.is_empty());

        let response = send(&app, "HEAD", "/items/3", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(read_bytes(response).await.is_empty());
    }
}
