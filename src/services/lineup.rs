use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::LoadError;
use crate::models::{ChannelView, GuideFeed};
use crate::services::epg::EpgLoader;
use crate::services::grouper::ChannelGrouper;
use crate::services::m3u_parser::parse_m3u;
use crate::services::source::{resolve_guide_url, PlaylistSource};

/// Loads playlists into the lineup and keeps the latest rendered view.
///
/// Starting a load cancels the one in flight, and a load that was
/// cancelled never replaces the stored view.
pub struct LineupService {
    client: Client,
    epg: EpgLoader,
    max_playlist_bytes: u64,
    in_flight: Mutex<CancellationToken>,
    view: RwLock<Option<Arc<ChannelView>>>,
}

impl LineupService {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .gzip(true)
            .build()?;

        Ok(Self {
            epg: EpgLoader::new(client.clone(), config.max_guide_bytes() as u64),
            client,
            max_playlist_bytes: config.max_playlist_bytes() as u64,
            in_flight: Mutex::new(CancellationToken::new()),
            view: RwLock::new(None),
        })
    }

    /// Last successfully loaded view
    pub async fn current(&self) -> Option<Arc<ChannelView>> {
        self.view.read().await.clone()
    }

    /// Cancel the running load and hand out a token for a new one
    async fn begin_load(&self) -> CancellationToken {
        let mut in_flight = self.in_flight.lock().await;
        in_flight.cancel();
        *in_flight = CancellationToken::new();
        in_flight.clone()
    }

    async fn build_view(&self, source: &PlaylistSource) -> Result<ChannelView, LoadError> {
        let text = source
            .read_text(&self.client, self.max_playlist_bytes)
            .await?;
        let playlist = parse_m3u(&text);

        let guide = match playlist
            .guide_url
            .as_deref()
            .and_then(|raw| resolve_guide_url(source.base_url(), raw))
        {
            Some(url) => self.epg.load(url.as_str()).await,
            None => GuideFeed::new(),
        };
        if guide.is_empty() {
            tracing::debug!("No guide data, channels will show without programme");
        }

        Ok(ChannelGrouper::group(&playlist.channels, &guide))
    }

    /// Load `source`, group it and store the result as the current view
    pub async fn load(&self, source: PlaylistSource) -> Result<Arc<ChannelView>, LoadError> {
        let token = self.begin_load().await;
        tracing::info!("Loading playlist: {}", source.describe());

        let view = tokio::select! {
            _ = token.cancelled() => {
                tracing::info!("Load of {} superseded", source.describe());
                return Err(LoadError::Superseded);
            }
            result = self.build_view(&source) => result,
        };

        let view = match view {
            Ok(view) => Arc::new(view),
            Err(e) => {
                tracing::error!("Playlist load failed for {}: {}", source.describe(), e);
                return Err(e);
            }
        };

        let mut slot = self.view.write().await;
        if token.is_cancelled() {
            tracing::info!("Load of {} superseded", source.describe());
            return Err(LoadError::Superseded);
        }
        *slot = Some(view.clone());

        tracing::info!(
            groups = view.groups.len(),
            channels = view.channel_count(),
            entries = view.entry_count,
            "Lineup updated"
        );

        Ok(view)
    }
}
