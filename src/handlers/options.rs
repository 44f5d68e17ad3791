use crate::routes;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

/// OPTIONS /items/{id} handler - Advertise the per-item methods
///
/// The answer does not depend on whether the item exists.
#[utoipa::path(
    options,
    path = routes::ITEM,
    params(
        ("id" = i64, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Allowed methods in the Allow header")
    ),
    tag = "items"
)]
pub async fn item_options_handler() -> impl IntoResponse {
    (StatusCode::OK, [(header::ALLOW, routes::ITEM_ALLOW)])
}

/// OPTIONS /items handler - Advertise the collection methods
#[utoipa::path(
    options,
    path = routes::ITEMS,
    responses(
        (status = 200, description = "Allowed methods in the Allow header")
    ),
    tag = "items"
)]
pub async fn items_options_handler() -> impl IntoResponse {
    (StatusCode::OK, [(header::ALLOW, routes::ITEMS_ALLOW)])
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{empty_app, send};
    use axum::http::{header, StatusCode};

    #[tokio::test]
    async fn test_item_options_independent_of_existence() {
        let app = empty_app();

        let response = send(&app, "OPTIONS", "/items/12345", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ALLOW).unwrap(),
            "GET,POST,PUT,PATCH,DELETE,HEAD,OPTIONS"
        );
    }

    #[tokio::test]
    async fn test_items_options() {
        let app = empty_app();

        let response = send(&app, "OPTIONS", "/items", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ALLOW).unwrap(),
            "GET,POST,OPTIONS"
        );
    }
}
