use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};
use service::{
    auth::{AuthConfig, AuthService},
    products::ProductService,
    runtime,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Host/port from the validated config
pub fn load_bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let raw = format!("{}:{}", cfg.server.host, cfg.server.port);
    raw.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address {raw}: {e}")))
}

/// Wire the catalogue and auth services from `cfg` and build the router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    runtime::ensure_env(&cfg.storage.images_dir, &cfg.storage.data_file).await?;

    let catalog = ProductService::open(&cfg.storage.data_file)
        .await
        .map_err(|e| StartupError::Any(anyhow::anyhow!(e)))?;
    let auth = AuthService::new(AuthConfig {
        jwt_secret: cfg.auth.jwt_secret.clone(),
        token_ttl_secs: cfg.auth.token_ttl_secs,
        admin_user: cfg.auth.admin_user.clone(),
        admin_password: cfg.auth.admin_password.clone(),
    });
    let state = ServerState { catalog: Arc::new(catalog), auth: Arc::new(auth) };

    Ok(routes::build_router(state, &cfg.storage.images_dir, build_cors()))
}

/// Public entry: serve `cfg` until `shutdown` resolves, then drain in-flight
/// requests.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(&cfg).await?;

    let addr = load_bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.to_string(), source })?;
    info!(%addr, data_file = %cfg.storage.data_file, "Servidor corriendo en http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| StartupError::Any(e.into()))?;
    info!("server stopped");
    Ok(())
}
