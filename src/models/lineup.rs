use chrono::{DateTime, Utc};
use serde::Serialize;

/// Shown in place of a programme title when the guide has nothing airing
pub const NO_PROGRAMME: &str = "Sin programación";

/// One playable stream of a grouped channel (e.g. the HD or the SD feed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamVariant {
    /// Original display name of the entry
    pub label: String,
    pub stream_url: String,
}

/// Channel entries sharing base name and current programme within a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedChannel {
    /// Merge key, unique within its group
    pub key: String,
    pub logo_url: String,
    pub guide_id: String,
    pub base_name: String,
    pub current_programme: String,
    pub variants: Vec<StreamVariant>,
}

/// How a grouped channel turns into a stream URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Exactly one variant, no choice needed
    Direct(&'a StreamVariant),
    /// The caller has to pick one of these
    Choose(&'a [StreamVariant]),
}

impl GroupedChannel {
    pub fn selection(&self) -> Selection<'_> {
        match self.variants.as_slice() {
            [single] => Selection::Direct(single),
            variants => Selection::Choose(variants),
        }
    }

    /// Resolve to a stream URL. Single-variant channels need no choice;
    /// multi-variant channels need a valid index.
    pub fn resolve(&self, choice: Option<usize>) -> Option<&str> {
        match (self.selection(), choice) {
            (Selection::Direct(variant), None | Some(0)) => Some(variant.stream_url.as_str()),
            (Selection::Direct(_), Some(_)) => None,
            (Selection::Choose(variants), Some(index)) => {
                variants.get(index).map(|v| v.stream_url.as_str())
            }
            (Selection::Choose(_), None) => None,
        }
    }
}

/// A named group of channels, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelGroup {
    pub name: String,
    pub channels: Vec<GroupedChannel>,
}

/// Everything the presentation layer needs to render the lineup
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelView {
    pub groups: Vec<ChannelGroup>,
    pub entry_count: usize,
    pub guide_channels: usize,
    pub generated_at: DateTime<Utc>,
}

impl ChannelView {
    pub fn group(&self, name: &str) -> Option<&ChannelGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn find(&self, group: &str, key: &str) -> Option<&GroupedChannel> {
        self.group(group)?.channels.iter().find(|c| c.key == key)
    }

    pub fn channel_count(&self) -> usize {
        self.groups.iter().map(|g| g.channels.len()).sum()
    }
}
