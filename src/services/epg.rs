//! XMLTV guide loading and current-programme lookup.
//!
//! The loader never fails its caller: any network, HTTP or XML problem is
//! logged and replaced by an empty [`GuideFeed`], so the lineup still
//! renders, only without programme titles.

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;

use crate::error::GuideError;
use crate::models::{GuideFeed, Programme};

const TAG_PROGRAMME: &[u8] = b"programme";
const TAG_TITLE: &[u8] = b"title";
const ATTR_CHANNEL: &str = "channel";
const ATTR_START: &str = "start";
const ATTR_STOP: &str = "stop";

/// Fixed-width timestamp layout shared by guide keys and "now"
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const XMLTV_OFFSET_FORMAT: &str = "%Y%m%d%H%M%S %z";
const TIMESTAMP_LEN: usize = 14;

/// Current instant as a 14-digit UTC key
pub fn now_key() -> String {
    timestamp_key(Utc::now())
}

pub fn timestamp_key(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Normalize an XMLTV time attribute to a 14-digit UTC key.
/// `20240115120000 +0100` becomes `20240115110000`; values without a
/// parsable offset keep their first 14 digits.
pub fn normalize_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_str(raw, XMLTV_OFFSET_FORMAT) {
        return timestamp_key(parsed.with_timezone(&Utc));
    }
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(TIMESTAMP_LEN)
        .collect()
}

/// Programme airing on `channel_id` at `now` (14-digit key).
/// Scans in feed order; the first programme covering `now` wins.
/// An empty id never matches.
pub fn current_programme_at<'a>(
    feed: &'a GuideFeed,
    channel_id: &str,
    now: &str,
) -> Option<&'a Programme> {
    if channel_id.is_empty() {
        return None;
    }
    feed.programmes(channel_id)?
        .iter()
        .find(|p| p.is_airing_at(now))
}

/// Programme being assembled while its element is open
#[derive(Debug, Default)]
struct OpenProgramme {
    channel: String,
    start: String,
    stop: String,
    title: Option<String>,
    in_title: bool,
}

fn attribute(e: &BytesStart, name: &str) -> Result<String, GuideError> {
    match e
        .try_get_attribute(name)
        .map_err(|err| GuideError::Xml(err.to_string()))?
    {
        Some(attr) => attr
            .unescape_value()
            .map(|v| v.into_owned())
            .map_err(|err| GuideError::Xml(err.to_string())),
        None => Ok(String::new()),
    }
}

fn open_programme(e: &BytesStart) -> Result<OpenProgramme, GuideError> {
    Ok(OpenProgramme {
        channel: attribute(e, ATTR_CHANNEL)?,
        start: normalize_timestamp(&attribute(e, ATTR_START)?),
        stop: normalize_timestamp(&attribute(e, ATTR_STOP)?),
        ..OpenProgramme::default()
    })
}

fn close_programme(feed: &mut GuideFeed, open: OpenProgramme, skipped: &mut usize) {
    if open.channel.is_empty() {
        tracing::warn!(start = %open.start, "Skipping programme without channel");
        *skipped += 1;
        return;
    }
    match open.title {
        Some(title) => feed.push(
            open.channel,
            Programme {
                start: open.start,
                stop: open.stop,
                title,
            },
        ),
        None => {
            tracing::warn!(channel = %open.channel, start = %open.start, "Skipping programme without title");
            *skipped += 1;
        }
    }
}

/// Parse an XMLTV document into a guide feed.
///
/// Only `<programme>` elements are read; the first `<title>` child of each
/// one is kept, trimmed. Programmes without a channel or title are skipped.
pub fn parse_xmltv(xml: &str) -> Result<GuideFeed, GuideError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut feed = GuideFeed::new();
    let mut current: Option<OpenProgramme> = None;
    let mut skipped = 0usize;

    loop {
        match reader
            .read_event()
            .map_err(|e| GuideError::Xml(format!("at position {}: {}", reader.buffer_position(), e)))?
        {
            Event::Eof => break,
            Event::Start(e) => match e.name().as_ref() {
                TAG_PROGRAMME => current = Some(open_programme(&e)?),
                TAG_TITLE => {
                    if let Some(open) = current.as_mut() {
                        open.in_title = open.title.is_none();
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                TAG_PROGRAMME => close_programme(&mut feed, open_programme(&e)?, &mut skipped),
                TAG_TITLE => {
                    if let Some(open) = current.as_mut() {
                        open.title.get_or_insert_with(String::new);
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some(open) = current.as_mut().filter(|o| o.in_title) {
                    let text = t.unescape().map_err(|e| GuideError::Xml(e.to_string()))?;
                    open.title.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Event::CData(t) => {
                if let Some(open) = current.as_mut().filter(|o| o.in_title) {
                    let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                    open.title.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                TAG_TITLE => {
                    if let Some(open) = current.as_mut() {
                        if open.in_title {
                            open.title.get_or_insert_with(String::new);
                            open.in_title = false;
                        }
                    }
                }
                TAG_PROGRAMME => {
                    if let Some(open) = current.take() {
                        close_programme(&mut feed, open, &mut skipped);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    tracing::info!(
        channels = feed.channel_count(),
        programmes = feed.programme_count(),
        skipped = skipped,
        "Guide parsed"
    );

    Ok(feed)
}

/// Fetches XMLTV guides over HTTP
#[derive(Clone)]
pub struct EpgLoader {
    client: Client,
    max_bytes: u64,
}

impl EpgLoader {
    pub fn new(client: Client, max_bytes: u64) -> Self {
        Self { client, max_bytes }
    }

    async fn fetch(&self, url: &str) -> Result<GuideFeed, GuideError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GuideError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GuideError::Http(status.as_u16()));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(GuideError::TooLarge(len));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| GuideError::Network(e.to_string()))?;

        if body.len() as u64 > self.max_bytes {
            return Err(GuideError::TooLarge(body.len() as u64));
        }

        parse_xmltv(&body)
    }

    /// Load the guide at `url`. Falls back to an empty feed on any error.
    pub async fn load(&self, url: &str) -> GuideFeed {
        tracing::info!("Loading guide: {}", url);
        match self.fetch(url).await {
            Ok(feed) => feed,
            Err(e) => {
                tracing::warn!(url = url, error = %e, "Guide unavailable, continuing without programme info");
                GuideFeed::new()
            }
        }
    }
}
