use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::error::LoadError;
use crate::models::{ChannelView, PlayQuery, UploadRequest};
use crate::services::actions::{action_by_name, ActionOutcome};
use crate::services::source::PlaylistSource;
use crate::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

fn load_error(err: LoadError) -> ApiError {
    let status = match err {
        LoadError::SourceUnavailable(_) => StatusCode::BAD_GATEWAY,
        LoadError::InvalidFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        LoadError::Superseded => StatusCode::CONFLICT,
    };
    api_error(status, err.to_string())
}

async fn load_default(state: &AppState) -> Result<Arc<ChannelView>, ApiError> {
    let source = PlaylistSource::from_location(&state.config.playlist_source);
    state.lineup.load(source).await.map_err(load_error)
}

/// GET /api/channels - Current lineup (loads the default playlist on first use)
pub async fn get_channels(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Arc<ChannelView>>, ApiError> {
    if let Some(view) = state.lineup.current().await {
        return Ok(Json(view));
    }
    load_default(&state).await.map(Json)
}

/// POST /api/channels/reload - Reload the default playlist
pub async fn reload_channels(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Arc<ChannelView>>, ApiError> {
    load_default(&state).await.map(Json)
}

/// POST /api/channels/upload - Load a playlist file provided by the user
pub async fn upload_playlist(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UploadRequest>,
) -> Result<Json<Arc<ChannelView>>, ApiError> {
    let source = PlaylistSource::upload(&payload.file_name, payload.content).map_err(load_error)?;
    state.lineup.load(source).await.map(Json).map_err(load_error)
}

/// GET /api/channels/play - Resolve a channel to a stream URL and apply an action
/// `open` redirects to the stream, `copy` returns the link as plain text
pub async fn play_channel(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlayQuery>,
) -> Result<Response, ApiError> {
    let action = action_by_name(&query.action).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("unknown action: {}", query.action),
        )
    })?;

    let view = state
        .lineup
        .current()
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no playlist loaded"))?;

    let channel = view.find(&query.group, &query.key).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("channel not found: {} / {}", query.group, query.key),
        )
    })?;

    let stream_url = channel.resolve(query.variant).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "choose one of the variants",
                "variants": channel.variants,
            })),
        )
    })?;

    tracing::info!(
        action = action.name(),
        group = %query.group,
        channel = %channel.base_name,
        "Stream resolved"
    );

    match action.perform(stream_url) {
        ActionOutcome::Open(url) => {
            let location = HeaderValue::from_str(&url).map_err(|_| {
                api_error(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "stream URL is not a valid redirect target",
                )
            })?;
            Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
        }
        ActionOutcome::Copy(url) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            url,
        )
            .into_response()),
    }
}
