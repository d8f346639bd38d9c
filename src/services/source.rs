use reqwest::Client;
use std::path::PathBuf;
use url::Url;

use crate::error::LoadError;

/// File extensions accepted for user uploads
const PLAYLIST_EXTENSIONS: [&str; 2] = [".m3u", ".m3u8"];

/// Where playlist text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistSource {
    /// Fetched over HTTP(S)
    Remote(Url),
    /// Read from the local filesystem
    File(PathBuf),
    /// File contents sent by the user
    Upload { file_name: String, content: String },
}

impl PlaylistSource {
    /// http(s) URLs become remote sources, anything else a file path
    pub fn from_location(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            _ => Self::File(PathBuf::from(location)),
        }
    }

    /// Accept a user file, rejecting anything that is not a playlist
    pub fn upload(file_name: &str, content: String) -> Result<Self, LoadError> {
        let lower = file_name.to_lowercase();
        if !PLAYLIST_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            tracing::info!(file_name = file_name, "Rejected non-playlist upload");
            return Err(LoadError::InvalidFileType(file_name.to_string()));
        }
        Ok(Self::Upload {
            file_name: file_name.to_string(),
            content,
        })
    }

    /// Base for resolving relative guide URLs
    pub fn base_url(&self) -> Option<&Url> {
        match self {
            Self::Remote(url) => Some(url),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Remote(url) => url.to_string(),
            Self::File(path) => path.display().to_string(),
            Self::Upload { file_name, .. } => format!("upload:{}", file_name),
        }
    }

    /// Read the playlist text
    pub async fn read_text(&self, client: &Client, max_bytes: u64) -> Result<String, LoadError> {
        match self {
            Self::Remote(url) => fetch_text(client, url, max_bytes).await,
            Self::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                LoadError::SourceUnavailable(format!("{}: {}", path.display(), e))
            }),
            Self::Upload { content, .. } => Ok(content.clone()),
        }
    }
}

async fn fetch_text(client: &Client, url: &Url, max_bytes: u64) -> Result<String, LoadError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| LoadError::SourceUnavailable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("Error");
        return Err(LoadError::SourceUnavailable(format!(
            "HTTP {}: {}",
            status.as_u16(),
            reason
        )));
    }

    if let Some(len) = response.content_length() {
        if len > max_bytes {
            return Err(LoadError::SourceUnavailable(format!(
                "playlist too large: {:.1}MB",
                len as f64 / 1024f64 / 1024f64
            )));
        }
    }

    let text = response
        .text()
        .await
        .map_err(|e| LoadError::SourceUnavailable(e.to_string()))?;

    if text.len() as u64 > max_bytes {
        return Err(LoadError::SourceUnavailable(format!(
            "playlist too large: {:.1}MB",
            text.len() as f64 / 1024f64 / 1024f64
        )));
    }

    Ok(text)
}

/// Resolve the guide URL found in a playlist.
/// Absolute http(s) URLs are kept, relative ones are joined to the remote
/// playlist URL. Relative URLs without a remote base cannot be fetched.
pub fn resolve_guide_url(base: Option<&Url>, raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let resolved = match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => base.and_then(|b| b.join(raw).ok()),
        Err(_) => None,
    };

    match resolved {
        Some(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        _ => {
            tracing::warn!(guide_url = raw, "Guide URL cannot be fetched, skipping guide");
            None
        }
    }
}
