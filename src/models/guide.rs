use serde::Serialize;
use std::collections::HashMap;

/// One scheduled programme from the XMLTV feed.
///
/// `start` and `stop` hold 14-digit UTC keys (`YYYYMMDDHHmmss`), so plain
/// string comparison orders them chronologically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Programme {
    pub start: String,
    pub stop: String,
    pub title: String,
}

impl Programme {
    /// True when `now` falls in `[start, stop)`
    pub fn is_airing_at(&self, now: &str) -> bool {
        self.start.as_str() <= now && self.stop.as_str() > now
    }
}

/// Programmes per guide channel id, in feed order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuideFeed {
    channels: HashMap<String, Vec<Programme>>,
}

impl GuideFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, channel_id: impl Into<String>, programme: Programme) {
        self.channels
            .entry(channel_id.into())
            .or_default()
            .push(programme);
    }

    pub fn programmes(&self, channel_id: &str) -> Option<&[Programme]> {
        self.channels.get(channel_id).map(Vec::as_slice)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn programme_count(&self) -> usize {
        self.channels.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
