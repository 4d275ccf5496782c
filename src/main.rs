// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::loader_service::DataLoader;
use crate::application::view_service::ViewController;
use crate::infrastructure::config::{load_river_catalog, load_server_config};
use crate::infrastructure::csv_repository::CsvRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let server_config = load_server_config().context("Failed to load server configuration")?;

    // Initialize tracing; RUST_LOG wins over the debug switch
    let default_filter = if server_config.server.debug {
        "river_dashboard=debug,tower_http=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let catalog = Arc::new(load_river_catalog().context("Failed to load river schemas")?);
    tracing::info!(
        "Monitoring {} rivers: {}",
        catalog.rivers().len(),
        catalog
            .rivers()
            .iter()
            .map(|r| r.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Create repository (infrastructure layer)
    let repository = Arc::new(CsvRepository::new(
        server_config.data.directory.clone(),
        server_config.data.raw_pattern.clone(),
        server_config.data.cleaned_pattern.clone(),
    ));

    // Create services (application layer)
    let loader = DataLoader::new(repository);
    let view_controller = ViewController::new(catalog, loader);

    let state = Arc::new(AppState { view_controller });
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", server_config.server.host, server_config.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!(
        "Starting river dashboard on http://{} (data directory {}, debug {})",
        addr,
        server_config.data.directory.display(),
        server_config.server.debug
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
