use crate::error::{ApiError, ErrorResponse};
use crate::models::Item;
use crate::routes;
use crate::state::AppState;
use crate::store::ItemStore;
use axum::{extract::State, http::StatusCode, Json};

/// GET /items handler - List all items
///
/// The in-memory store returns items in insertion order, Spanner in
/// ascending id order.
#[utoipa::path(
    get,
    path = routes::ITEMS,
    responses(
        (status = 200, description = "All items", body = [Item]),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn list_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<Item>>), ApiError> {
    let items = state.store.list().await?;

    tracing::info!("Listed {} items", items.len());
    Ok((StatusCode::OK, Json(items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{empty_app, read_json, sample_app, send};

    #[tokio::test]
    async fn test_list_endpoint_empty() {
        let app = empty_app();

        let response = send(&app, "GET", "/items", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let items: Vec<Item> = read_json(response).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_list_endpoint_with_data() {
        let app = sample_app();

        let response = send(
            &app,
            "POST",
            "/items",
            Some(serde_json::json!({"name": "Cherry", "price": 3.25})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(&app, "GET", "/items", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let items: Vec<Item> = read_json(response).await;
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[2],
            Item {
                id: 3,
                name: "Cherry".to_string(),
                price: 3.25
            }
        );
    }
}
