use std::path::Path;

use axum::{
    handler::HandlerWithoutStateExt,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::errors::JsonApiError;

pub mod auth;
pub mod products;

use auth::ServerState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn not_found() -> JsonApiError {
    JsonApiError::not_found("Ruta no encontrada")
}

/// Catalogue routes; reads are public, mutations sit behind the bearer gate.
fn product_routes(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/", get(products::list_products))
        .route("/:id", get(products::get_product));

    let protected = Router::new()
        .route("/", post(products::create_product))
        .route("/:id", put(products::update_product).delete(products::delete_product))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token));

    public.merge(protected)
}

/// Build the full application router: health, login, catalogue, static images
/// and the JSON 404 fallback.
pub fn build_router(state: ServerState, images_dir: impl AsRef<Path>, cors: CorsLayer) -> Router {
    let images = ServeDir::new(images_dir.as_ref()).fallback(not_found.into_service());
    let products = product_routes(&state);

    Router::new()
        .route("/health", get(health))
        .route("/api/login", post(auth::login))
        .nest("/api/productos", products.clone())
        .nest("/products", products)
        .nest_service("/images", images)
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
