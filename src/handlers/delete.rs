use crate::error::{parse_item_id, ApiError, ErrorResponse};
use crate::models::MessageResponse;
use crate::routes;
use crate::state::AppState;
use crate::store::ItemStore;
use axum::{extract::Path, extract::State, http::StatusCode, Json};

/// DELETE /items/{id} handler - Remove an item
#[utoipa::path(
    delete,
    path = routes::ITEM,
    params(
        ("id" = i64, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 400, description = "Invalid item id", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let id = parse_item_id(&id_str)?;

    if !state.store.delete(id).await? {
        tracing::info!("Nothing to delete for id: {}", id);
        return Err(ApiError::ItemNotFound);
    }

    tracing::info!("Deleted item with id: {}", id);
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Item deleted".to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{empty_app, read_json, sample_app, send};

    #[tokio::test]
    async fn test_delete_then_get_and_head() {
        let app = sample_app();

        let response = send(&app, "DELETE", "/items/1", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: MessageResponse = read_json(response).await;
        assert_eq!(body.message, "Item deleted");

        let response = send(&app, "GET", "/items/1", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, "HEAD", "/items/1", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_never_created() {
        let app = empty_app();

        let response = send(&app, "DELETE", "/items/999", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let error_response: ErrorResponse = read_json(response).await;
        assert_eq!(error_response.error, "Item not found");
    }
}
