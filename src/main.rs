use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

mod config;
mod error;
mod logging;
mod models;
mod routes;
mod services;

use services::dataset::{Dataset, DatasetKind};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::Config::from_env()?;
    let port = config.port;
    let max_upload_bytes = config.max_upload_bytes;

    // Build our application state
    let state = Arc::new(AppState::new(config));

    // Build our application with a route
    let app = Router::new()
        .merge(routes::routes())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Run it
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Application state: one slot per dataset kind, replaced on every upload.
// The two pipelines are independent; a failed upload leaves its slot empty
// and the other slot untouched.
pub struct AppState {
    config: config::Config,
    datasets: RwLock<HashMap<DatasetKind, Dataset>>,
}

impl AppState {
    fn new(config: config::Config) -> Self {
        Self {
            config,
            datasets: RwLock::new(HashMap::new()),
        }
    }
}
