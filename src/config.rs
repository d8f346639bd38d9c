use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Playlist
    pub playlist_source: String,
    pub load_on_startup: bool,
    pub max_playlist_size_mb: usize,
    pub max_guide_size_mb: usize,

    // Fetching
    pub fetch_timeout_ms: u64,
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Server
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .unwrap_or(3001),

            // Playlist - URL or local path
            playlist_source: env::var("PLAYLIST_SOURCE")
                .unwrap_or_else(|_| "./lista-ace.m3u".to_string()),

            load_on_startup: env::var("LOAD_ON_STARTUP")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),

            max_playlist_size_mb: env::var("MAX_PLAYLIST_SIZE_MB")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .unwrap_or(50),

            max_guide_size_mb: env::var("MAX_GUIDE_SIZE_MB")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),

            // Fetching
            fetch_timeout_ms: env::var("FETCH_TIMEOUT_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse()
                .unwrap_or(30_000), // 30 seconds

            // Use VLC user agent to avoid IPTV server blocks
            user_agent: env::var("USER_AGENT")
                .unwrap_or_else(|_| "VLC/3.0.20 LibVLC/3.0.20".to_string()),
        }
    }

    pub fn max_playlist_bytes(&self) -> usize {
        self.max_playlist_size_mb * 1024 * 1024
    }

    pub fn max_guide_bytes(&self) -> usize {
        self.max_guide_size_mb * 1024 * 1024
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
