use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;

/// Server configuration
pub mod config;

/// Server errors and their HTTP mapping
pub mod error;

/// Request handlers
pub mod routes;

/// Shared handler state
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use state::AppState;

/// Build the router with every endpoint
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::entities))
        .route("/health", get(routes::health))
        .with_state(state)
}

/// Bind to the configured address and serve until the process exits
pub async fn serve(config: &ServerConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    log::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state)).await?;

    Ok(())
}
