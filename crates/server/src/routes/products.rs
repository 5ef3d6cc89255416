use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use common::types::MessageBody;
use service::auth::domain::Claims;
use service::products::{NewProduct, Product, ProductPatch};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub nombre: Option<String>,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, JsonApiError> {
    body.map(|Json(v)| v).map_err(|e| {
        tracing::debug!(err = %e, "rejected request body");
        JsonApiError::bad_request(e.body_text())
    })
}

/// List products, optionally filtered by `?nombre=`
pub async fn list_products(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, JsonApiError> {
    let products = state.catalog.list(q.nombre.as_deref()).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, JsonApiError> {
    Ok(Json(state.catalog.get(&id).await?))
}

/// Create a product; 201 with the stored record
pub async fn create_product(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), JsonApiError> {
    let input = json_body(body)?;
    let saved = state.catalog.create(input).await?;
    tracing::info!(usuario = %claims.user(), id = %saved.product.id, "create accepted");
    Ok((StatusCode::CREATED, Json(saved.product)))
}

pub async fn update_product(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    body: Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Json<Product>, JsonApiError> {
    let patch = json_body(body)?;
    let saved = state.catalog.update(&id, patch).await?;
    tracing::info!(usuario = %claims.user(), %id, "update accepted");
    Ok(Json(saved.product))
}

pub async fn delete_product(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, JsonApiError> {
    let mensaje = state.catalog.delete(&id).await?;
    tracing::info!(usuario = %claims.user(), %id, "delete accepted");
    Ok(Json(MessageBody { mensaje }))
}
