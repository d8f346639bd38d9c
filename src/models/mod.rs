pub mod guide;
pub mod lineup;
pub mod playlist;

pub use guide::{GuideFeed, Programme};
pub use lineup::{ChannelGroup, ChannelView, GroupedChannel, StreamVariant, NO_PROGRAMME};
pub use playlist::{
    ChannelEntry, ParsedPlaylist, PlayQuery, UploadRequest, DEFAULT_GROUP, PLACEHOLDER_LOGO,
};
