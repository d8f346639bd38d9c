use serde::Deserialize;

/// Logo used when an entry carries no `tvg-logo` attribute
pub const PLACEHOLDER_LOGO: &str = "https://via.placeholder.com/100";

/// Group used when an entry carries no `group-title` attribute
pub const DEFAULT_GROUP: &str = "OTROS";

/// Single channel entry (one `#EXTINF` line plus its stream URL)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntry {
    pub name: String,
    pub logo_url: String,
    /// `tvg-id`, empty when absent. Empty ids never match a guide channel.
    pub guide_id: String,
    pub group: String,
    pub stream_url: String,
}

/// Result of parsing a playlist text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPlaylist {
    pub channels: Vec<ChannelEntry>,
    pub guide_url: Option<String>,
}

/// Request to load a playlist file dropped by the user
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_name: String,
    pub content: String,
}

/// Query parameters for the play endpoint
#[derive(Debug, Deserialize)]
pub struct PlayQuery {
    pub group: String,
    pub key: String,
    #[serde(default)]
    pub variant: Option<usize>,
    #[serde(default = "default_action")]
    pub action: String,
}

fn default_action() -> String {
    "open".to_string()
}
