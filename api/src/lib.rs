use std::{env, sync::Arc};

mod core;
pub mod error_handler;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use source_host::SourceHost;
use tokio::signal;
use tracing::{error, info};

pub use crate::core::app_state::AppState;
use crate::{
    error_handler::AppError,
    routes::{gitlab_webhook::merge_request_route::merge_request_webhook, health_route::health},
};

/// Listen address used when `API_ADDRESS` is not set.
pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8080";

/// HTTP routes over an already-built state.
pub fn router<S: SourceHost + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route(
            "/webhooks/gitlab/mergerequest",
            post(merge_request_webhook::<S>),
        )
        .route("/health", get(health))
        .with_state(state)
}

pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_API_ADDRESS.to_string());

    let state = Arc::new(AppState::from_env()?);
    let app = router(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!("listening on {host_url}");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => error!("failed to listen for shutdown signal: {e}"),
    }
}
