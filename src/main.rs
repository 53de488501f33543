// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::result_service::ResultService;
use crate::application::session_service::SessionService;
use crate::application::telemetry_api::TelemetryApi;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_telemetry_api::HttpTelemetryApi;
use crate::infrastructure::settings_file::SettingsFile;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create adapters (infrastructure layer)
    let api: Arc<dyn TelemetryApi> = Arc::new(HttpTelemetryApi::new(
        config.api.base_url.clone(),
        Duration::from_secs(config.api.timeout_secs),
    )?);
    let store = Arc::new(SettingsFile::new(&config.storage.settings_path));

    // Create services (application layer)
    let dashboard = DashboardService::start(api.clone(), store, config.polling.period()).await?;
    let results = ResultService::new(api.clone(), config.display.offset_hours);
    let sessions = SessionService::new(api);

    let state = Arc::new(AppState {
        dashboard,
        results,
        sessions,
        display_offset_hours: config.display.offset_hours,
        map: config.map,
    });

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!(
        "Starting power-game-dashboard on {} (telemetry API {})",
        addr,
        config.api.base_url
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state)).await?;

    Ok(())
}
