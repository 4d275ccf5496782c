// Infrastructure layer - External dependencies and adapters
pub mod chart_renderer;
pub mod config;
pub mod csv_repository;
pub mod html_page;
pub mod http_response;
