//! AOI Project Intake Backend server.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use aoi_backend::config::Config;
use aoi_backend::storage::DiskStorage;
use aoi_backend::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting AOI Project Intake Backend");
    tracing::info!("Upload directory: {:?}", config.upload_dir);
    tracing::info!("Upload limit: {} bytes", config.max_upload_bytes);
    tracing::info!("Bind address: {}", config.bind_addr);

    if !config.reject_advisory_hints {
        tracing::warn!("Advisory GeoJSON hints will not reject uploads");
    }

    // Initialize transient storage
    let storage = Arc::new(DiskStorage::open(&config.upload_dir)?);

    let state = AppState {
        storage,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server running at http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
