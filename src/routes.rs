// Route paths and router assembly

use axum::extract::Request;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;

pub const ROOT: &str = "/";
pub const HEALTH: &str = "/health";
pub const ITEMS: &str = "/items";
pub const ITEM: &str = "/items/{id}";

pub const SWAGGER_UI: &str = "/swagger-ui";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

/// Methods answered on `/items/{id}`, as advertised by OPTIONS
pub const ITEM_ALLOW: &str = "GET,POST,PUT,PATCH,DELETE,HEAD,OPTIONS";
/// Methods advertised by OPTIONS on `/items`
pub const ITEMS_ALLOW: &str = "GET,POST,OPTIONS";

/// Build the application router with all item routes and middleware
pub fn app(state: AppState) -> Router {
    let cors_enabled = state.config.cors_enabled;

    let router = Router::new()
        .route(ROOT, get(handlers::home_handler))
        .route(HEALTH, get(handlers::health_handler))
        .route(
            ITEMS,
            get(handlers::list_handler)
                .post(handlers::create_handler)
                .put(handlers::update_by_index_handler)
                .options(handlers::items_options_handler),
        )
        .route(
            ITEM,
            get(handlers::get_handler)
                .head(handlers::head_handler)
                .post(handlers::create_at_handler)
                .put(handlers::update_handler)
                .patch(handlers::patch_handler)
                .delete(handlers::delete_handler)
                .options(handlers::item_options_handler),
        )
        .merge(SwaggerUi::new(SWAGGER_UI).url(OPENAPI_JSON, ApiDoc::openapi()))
        .with_state(state);

    let router = if cors_enabled {
        router.layer(cors_layer())
    } else {
        router
    };

    // Outside CORS: the CORS layer answers every OPTIONS request itself
    router
        .layer(middleware::from_fn(advertise_allowed_methods))
        .layer(TraceLayer::new_for_http())
}

/// Methods to advertise for an OPTIONS request on `path`
fn allowed_methods(path: &str) -> Option<&'static str> {
    match path.strip_prefix(ITEMS)? {
        "" => Some(ITEMS_ALLOW),
        rest => match rest.strip_prefix('/') {
            Some(id) if !id.is_empty() && !id.contains('/') => Some(ITEM_ALLOW),
            _ => None,
        },
    }
}

/// Add an `Allow` header to OPTIONS responses on item routes that lack one
async fn advertise_allowed_methods(request: Request, next: Next) -> Response {
    let allow = (request.method() == Method::OPTIONS)
        .then(|| allowed_methods(request.uri().path()))
        .flatten();

    let mut response = next.run(request).await;
    if let Some(allow) = allow {
        response
            .headers_mut()
            .entry(header::ALLOW)
            .or_insert(HeaderValue::from_static(allow));
    }
    response
}

/// Allow any origin with the standard item methods and headers
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static("x-requested-with"),
        ])
}
