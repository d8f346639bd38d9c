mod config;
mod error;
mod models;
mod routes;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::{lineup::LineupService, source::PlaylistSource};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub lineup: LineupService,
    pub start_time: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iptv_lineup=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting IPTV Lineup v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Playlist source: {}", config.playlist_source);

    let lineup = LineupService::new(&config)?;

    // Build application state
    let state = Arc::new(AppState {
        config,
        lineup,
        start_time: Instant::now(),
    });

    // Initial load runs in background; failures are logged and the
    // lineup can still be loaded later through reload or upload
    if state.config.load_on_startup {
        let startup_state = state.clone();
        tokio::spawn(async move {
            let source = PlaylistSource::from_location(&startup_state.config.playlist_source);
            if let Err(e) = startup_state.lineup.load(source).await {
                tracing::warn!("Initial playlist load failed: {}", e);
            }
        });
    }

    let app = routes::router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
