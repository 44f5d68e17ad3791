use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Error response type
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

/// Custom error type for API endpoints
///
/// Every handler failure ends up here and is rendered as a JSON body with
/// an `error` field. Store failures are logged in full but only a fixed
/// description is returned to the caller.
#[derive(Debug)]
pub enum ApiError {
    /// Path parameter is not an integer id
    InvalidId(String),
    /// Request body is not valid JSON or doesn't match the expected shape
    InvalidBody(String),
    /// Update-by-index request without an `index`
    MissingIndex,
    ItemNotFound,
    IndexOutOfRange,
    ItemAlreadyExists,
    /// Unexpected store failure
    StoreFailure(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::InvalidId(id) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid item id: expected an integer, got '{}'", id),
                None,
            ),
            ApiError::InvalidBody(reason) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", reason),
                None,
            ),
            ApiError::MissingIndex => {
                (StatusCode::BAD_REQUEST, "Index is required".to_string(), None)
            }
            ApiError::ItemNotFound => (StatusCode::NOT_FOUND, "Item not found".to_string(), None),
            ApiError::IndexOutOfRange => {
                (StatusCode::NOT_FOUND, "Index out of range".to_string(), None)
            }
            ApiError::ItemAlreadyExists => (
                StatusCode::BAD_REQUEST,
                "Item already exists".to_string(),
                None,
            ),
            ApiError::StoreFailure(err) => {
                tracing::error!("Item store failure: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some("The item store could not complete the request".to_string()),
                )
            }
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::ItemNotFound,
            StoreError::AlreadyExists(_) => ApiError::ItemAlreadyExists,
            StoreError::IndexOutOfRange(_) => ApiError::IndexOutOfRange,
            StoreError::Backend(err) => ApiError::StoreFailure(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

/// Parse an `{id}` path segment
pub fn parse_item_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::InvalidId(raw.to_string()))
}
