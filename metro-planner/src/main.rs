use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use metro_planner::config::ServerConfig;
use metro_planner::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("metro_planner=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env();

    let source = match config.line_source() {
        Ok(source) => source,
        Err(e) => {
            error!(error = %e, "failed to set up data source");
            std::process::exit(1);
        }
    };

    info!(source = %source.describe(), "loading network");
    let state = match AppState::load(source, &config.route_cache_config()).await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to load network");
            std::process::exit(1);
        }
    };

    if let Some(every) = config.refresh_every() {
        spawn_refresh(state.clone(), every);
    }

    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    info!(addr = %config.bind_addr, "metro planner listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}

/// Reload the network every `every`, keeping the old one on failure.
fn spawn_refresh(state: AppState, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            match state.reload().await {
                Ok(reloaded) => info!(
                    generation = reloaded.generation,
                    stations = reloaded.stations,
                    "refreshed network"
                ),
                Err(e) => warn!(error = %e, "failed to refresh network"),
            }
        }
    });
}
