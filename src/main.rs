// Main entry point - Dependency injection and server setup
use std::sync::Arc;

use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use telemetry_analysis::application::chart_service::ChartService;
use telemetry_analysis::application::session_service::SessionService;
use telemetry_analysis::infrastructure::config::load_app_config;
use telemetry_analysis::infrastructure::file_repository::JsonSessionRepository;
use telemetry_analysis::presentation::app_state::AppState;
use telemetry_analysis::presentation::router::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(JsonSessionRepository::new(config.sessions.directory.clone()));

    // Create services (application layer)
    let session_service = SessionService::new(repository.clone());
    let chart_service = ChartService::new(repository, config.charts.clone());

    // Create application state
    let state = Arc::new(AppState {
        session_service,
        chart_service,
    });

    // Build router (presentation layer)
    let app = router(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server.socket_addr()?;
    tracing::info!(
        "Starting telemetry-analysis on {} (sessions from {})",
        addr,
        config.sessions.directory.display()
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
