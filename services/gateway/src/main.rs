mod config;
mod error;
mod handlers;
mod models;
mod router;
mod state;

use config::Config;
use matching_engine::Exchange;
use persistence::MemoryStore;
use router::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!("Starting matching engine gateway");

    let config = Config::from_env()?;
    tracing::debug!(database_url = %config.database_url, "order store configured");

    let exchange = Exchange::new(MemoryStore::new());
    let state = AppState::new(Arc::new(exchange));

    // Create router
    let app = create_router(state);

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
