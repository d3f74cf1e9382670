//! AOI Project Intake Backend
//!
//! Accepts project submissions with a GeoJSON area of interest, validates the
//! AOI through request-scoped transient storage and acknowledges creation.

pub mod aoi;
pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod geojson;
pub mod models;
pub mod storage;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use storage::TransientStorage;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn TransientStorage>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // The form is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/projects", post(api::create_project))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
