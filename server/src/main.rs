//! mockdb Server - schema-less JSON mock backend.
//!
//! Serves every collection in a single JSON file over REST, with filtering,
//! sorting and pagination on list reads.

use mockdb_engine::{RecordService, Store};
use mockdb_server::config::Config;
use mockdb_server::{create_router, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mockdb_server=debug,mockdb_engine=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting mockdb server on {}:{}", config.host, config.port);

    // Load the database file; the server does not start without it
    let store = tokio::task::spawn_blocking({
        let path = config.db_path.clone();
        move || Store::load(path)
    })
    .await??;
    tracing::info!("Using database file {}", store.path().display());

    let state = AppState::new(RecordService::new(Arc::new(store)));
    let app = create_router(state);

    // Start server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
