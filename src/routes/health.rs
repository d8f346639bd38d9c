use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Root endpoint - basic status
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "IPTV Lineup",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "runtime": "rust"
    }))
}

/// Lineup stats
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LineupStats {
    loaded: bool,
    groups: usize,
    channels: usize,
    entries: usize,
    guide_channels: usize,
}

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    uptime: u64,
    playlist_source: String,
    lineup: LineupStats,
}

/// GET /health - Health check with lineup stats
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();

    let lineup = match state.lineup.current().await {
        Some(view) => LineupStats {
            loaded: true,
            groups: view.groups.len(),
            channels: view.channel_count(),
            entries: view.entry_count,
            guide_channels: view.guide_channels,
        },
        None => LineupStats {
            loaded: false,
            groups: 0,
            channels: 0,
            entries: 0,
            guide_channels: 0,
        },
    };

    // Uploads still work without a lineup
    let status = if lineup.loaded { "ok" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        uptime,
        playlist_source: state.config.playlist_source.clone(),
        lineup,
    })
}

/// Liveness probe
pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, "alive")
}
