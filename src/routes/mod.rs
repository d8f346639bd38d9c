pub mod channels;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_playlist_bytes();

    Router::new()
        // Health endpoints
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/live", get(health::live))
        // Lineup endpoints
        .route("/api/channels", get(channels::get_channels))
        .route("/api/channels/reload", post(channels::reload_channels))
        .route("/api/channels/upload", post(channels::upload_playlist))
        .route("/api/channels/play", get(channels::play_channel))
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
