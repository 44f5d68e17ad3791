use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::{
    HomeResponse, Item, ItemMessageResponse, ItemPatch, ItemRequest, ItemResponse,
    MessageResponse, UpdateByIndexRequest,
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "rust-spanner-items API",
        version = "1.0.0",
        description = "CRUD service for items, backed by Google Cloud Spanner or an in-memory store"
    ),
    paths(
        handlers::health::health_handler,
        handlers::home::home_handler,
        handlers::list::list_handler,
        handlers::get::get_handler,
        handlers::get::head_handler,
        handlers::create::create_at_handler,
        handlers::create::create_handler,
        handlers::update::update_handler,
        handlers::update::update_by_index_handler,
        handlers::patch::patch_handler,
        handlers::delete::delete_handler,
        handlers::options::item_options_handler,
        handlers::options::items_options_handler
    ),
    components(
        schemas(
            Item,
            ItemPatch,
            ItemRequest,
            UpdateByIndexRequest,
            HomeResponse,
            ItemResponse,
            ItemMessageResponse,
            MessageResponse,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "items", description = "Item CRUD operations")
    )
)]
pub struct ApiDoc;
