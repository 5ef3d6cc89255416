use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Json,
};

use service::auth::{
    domain::{LoginInput, LoginOutput},
    AuthService,
};
use service::products::ProductCatalog;

use crate::errors::JsonApiError;

const MSG_TOKEN_REQUIRED: &str = "Token requerido en el header Authorization";
const MSG_TOKEN_MALFORMED: &str = "Token malformado";
const MSG_TOKEN_INVALID: &str = "Token inválido o expirado";

/// Shared state for every route.
#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<dyn ProductCatalog>,
    pub auth: Arc<AuthService>,
}

/// `POST /api/login`: exchange the admin credentials for a bearer token.
pub async fn login(
    State(state): State<ServerState>,
    body: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<LoginOutput>, JsonApiError> {
    let Json(input) = body.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    let token = state.auth.login(&input)?;
    Ok(Json(LoginOutput { token }))
}

/// Route layer for mutating routes: requires `Authorization: <scheme> <token>`
/// with a valid HS256 token. The decoded claims are added to the request
/// extensions for the handler.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_owned();

    let Some(header) = req.headers().get(AUTHORIZATION) else {
        tracing::warn!(path = %path, "missing Authorization header");
        return Err(JsonApiError::unauthorized(MSG_TOKEN_REQUIRED));
    };
    let token = header
        .to_str()
        .ok()
        .and_then(|h| h.split(' ').nth(1))
        .filter(|t| !t.is_empty())
        .map(str::to_owned);
    let Some(token) = token else {
        tracing::warn!(path = %path, "malformed Authorization header");
        return Err(JsonApiError::unauthorized(MSG_TOKEN_MALFORMED));
    };

    match state.auth.verify(&token) {
        Ok(claims) => {
            tracing::debug!(path = %path, usuario = %claims.user(), "token accepted");
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::error!(path = %path, err = %e, "token validation failed");
            Err(JsonApiError::forbidden(MSG_TOKEN_INVALID))
        }
    }
}
