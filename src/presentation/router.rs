// Route table and HTTP middleware
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{dashboard_page, health_check, list_rivers, parameter_options};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/healthz", get(health_check))
        .route("/rivers", get(list_rivers))
        .route("/parameters", get(parameter_options))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
