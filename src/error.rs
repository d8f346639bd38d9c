use thiserror::Error;

/// Failures that abort a playlist load and are reported to the user
#[derive(Debug, Error)]
pub enum LoadError {
    /// Playlist could not be fetched or read
    #[error("playlist unavailable: {0}")]
    SourceUnavailable(String),
    /// The offered file is not a playlist
    #[error("not an M3U playlist: {0}")]
    InvalidFileType(String),
    /// A newer load started before this one finished
    #[error("load superseded by a newer request")]
    Superseded,
}

/// Guide feed failures. Never reach the user: the loader logs them and
/// falls back to an empty feed.
#[derive(Debug, Error)]
pub enum GuideError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("guide too large: {0} bytes")]
    TooLarge(u64),
    #[error("XML error: {0}")]
    Xml(String),
}
