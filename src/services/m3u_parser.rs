use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{ChannelEntry, ParsedPlaylist, DEFAULT_GROUP, PLACEHOLDER_LOGO};

const HEADER_MARKER: &str = "#EXTM3U";
const ENTRY_MARKER: &str = "#EXTINF:";
const COMMENT_MARKER: char = '#';

lazy_static! {
    /// Guide feed URL on the header line
    static ref GUIDE_URL_REGEX: Regex = Regex::new(r#"url-tvg="([^"]+)""#).unwrap();
    /// Alternative spelling used by some providers
    static ref ALT_GUIDE_URL_REGEX: Regex = Regex::new(r#"x-tvg-url="([^"]+)""#).unwrap();

    static ref LOGO_REGEX: Regex = Regex::new(r#"tvg-logo="([^"]+)""#).unwrap();
    static ref ID_REGEX: Regex = Regex::new(r#"tvg-id="([^"]+)""#).unwrap();
    static ref GROUP_REGEX: Regex = Regex::new(r#"group-title="([^"]+)""#).unwrap();

    /// Promotional suffixes appended to display names by the list maintainers
    static ref PROMO_SUFFIXES: Vec<Regex> = vec![
        Regex::new(r"(?i)-->\s*NEW ERA\s*[IVX]*").unwrap(),
        Regex::new(r"(?i)-->\s*NEW LOOP\s*[IVX]*").unwrap(),
    ];
}

/// Parsed `#EXTINF` line, waiting for its stream URL
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingEntry {
    name: String,
    logo_url: String,
    guide_id: String,
    group: String,
}

impl PendingEntry {
    fn finish(self, stream_url: &str) -> ChannelEntry {
        ChannelEntry {
            name: self.name,
            logo_url: self.logo_url,
            guide_id: self.guide_id,
            group: self.group,
            stream_url: stream_url.to_string(),
        }
    }
}

fn capture(regex: &Regex, haystack: &str) -> Option<String> {
    regex
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Remove promotional suffixes from a display name
pub fn clean_display_name(raw: &str) -> String {
    PROMO_SUFFIXES
        .iter()
        .fold(raw.trim().to_string(), |name, pattern| {
            pattern.replace(&name, "").trim().to_string()
        })
}

/// Extract the guide URL from a header line
fn parse_header(line: &str) -> Option<String> {
    capture(&GUIDE_URL_REGEX, line).or_else(|| capture(&ALT_GUIDE_URL_REGEX, line))
}

/// Parse an EXTINF line
/// Format: #EXTINF:duration tvg-id="..." tvg-logo="..." group-title="...",Title
///
/// Never fails: a line without a comma yields an empty name, missing
/// attributes fall back to their defaults.
fn parse_extinf(line: &str) -> PendingEntry {
    let content = line.strip_prefix(ENTRY_MARKER).unwrap_or(line);

    let (header, title) = match content.find(',') {
        Some(first_comma) => (&content[..first_comma], &content[first_comma + 1..]),
        None => {
            tracing::debug!(line = line, "EXTINF line without display name");
            (content, "")
        }
    };

    PendingEntry {
        name: clean_display_name(title),
        logo_url: capture(&LOGO_REGEX, header).unwrap_or_else(|| PLACEHOLDER_LOGO.to_string()),
        guide_id: capture(&ID_REGEX, header).unwrap_or_default(),
        group: capture(&GROUP_REGEX, header).unwrap_or_else(|| DEFAULT_GROUP.to_string()),
    }
}

/// Parse playlist text into channel entries and the optional guide URL.
///
/// Entries whose `#EXTINF` line is not followed by a stream URL (another
/// `#EXTINF` line comes first, or the text ends) are dropped.
pub fn parse_m3u(text: &str) -> ParsedPlaylist {
    let mut channels = Vec::new();
    let mut guide_url: Option<String> = None;
    let mut pending: Option<PendingEntry> = None;
    let mut dropped = 0usize;

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with(HEADER_MARKER) {
            if guide_url.is_none() {
                guide_url = parse_header(line);
            }
            continue;
        }

        if line.starts_with(ENTRY_MARKER) {
            if let Some(unresolved) = pending.replace(parse_extinf(line)) {
                tracing::debug!(name = %unresolved.name, "Dropping entry without stream URL");
                dropped += 1;
            }
            continue;
        }

        // Other directives (#EXTVLCOPT, #EXTGRP, ...) and plain comments
        if line.starts_with(COMMENT_MARKER) {
            continue;
        }

        if let Some(entry) = pending.take() {
            channels.push(entry.finish(line));
        }
    }

    if let Some(unresolved) = pending {
        tracing::debug!(name = %unresolved.name, "Dropping trailing entry without stream URL");
        dropped += 1;
    }

    tracing::info!(
        channels = channels.len(),
        dropped = dropped,
        has_guide = guide_url.is_some(),
        "Playlist parsed"
    );

    ParsedPlaylist {
        channels,
        guide_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let parsed = parse_m3u("");
        assert!(parsed.channels.is_empty());
        assert_eq!(parsed.guide_url, None);
    }

    #[test]
    fn test_parse_extinf() {
        let line = r#"#EXTINF:-1 tvg-id="dazn1" tvg-logo="http://logo.com/dazn.png" group-title="LA LIGA",DAZN 1 FHD"#;
        let entry = parse_extinf(line);

        assert_eq!(entry.name, "DAZN 1 FHD");
        assert_eq!(entry.guide_id, "dazn1");
        assert_eq!(entry.logo_url, "http://logo.com/dazn.png");
        assert_eq!(entry.group, "LA LIGA");
    }

    #[test]
    fn test_parse_extinf_minimal() {
        let entry = parse_extinf("#EXTINF:-1,Canal Teste");

        assert_eq!(entry.name, "Canal Teste");
        assert_eq!(entry.logo_url, PLACEHOLDER_LOGO);
        assert_eq!(entry.guide_id, "");
        assert_eq!(entry.group, DEFAULT_GROUP);
    }

    #[test]
    fn test_parse_extinf_without_comma() {
        let entry = parse_extinf(r#"#EXTINF:-1 tvg-id="x""#);
        assert_eq!(entry.name, "");
        assert_eq!(entry.guide_id, "x");
    }

    #[test]
    fn test_parse_extinf_empty_name_and_broken_attributes() {
        let entry = parse_extinf(r#"#EXTINF:-1 tvg-logo="unterminated group-title=,"#);
        assert_eq!(entry.name, "");
        assert_eq!(entry.logo_url, PLACEHOLDER_LOGO);
        assert_eq!(entry.group, DEFAULT_GROUP);
    }

    #[test]
    fn test_promo_suffixes_are_stripped() {
        assert_eq!(clean_display_name("  M+ LaLiga --> NEW ERA IV "), "M+ LaLiga");
        assert_eq!(clean_display_name("DAZN F1 --> new loop xii"), "DAZN F1");
        assert_eq!(clean_display_name("Eurosport 1-->NEW ERA"), "Eurosport 1");
        assert_eq!(clean_display_name("Canal Normal"), "Canal Normal");
    }

    #[test]
    fn test_end_to_end_entry() {
        let text = "#EXTM3U url-tvg=\"http://x/epg.xml\"\n#EXTINF:-1 tvg-id=\"c1\" group-title=\"DEP\",Canal Uno HD\nhttp://stream/1";
        let parsed = parse_m3u(text);

        assert_eq!(parsed.guide_url.as_deref(), Some("http://x/epg.xml"));
        assert_eq!(
            parsed.channels,
            vec![ChannelEntry {
                name: "Canal Uno HD".to_string(),
                logo_url: PLACEHOLDER_LOGO.to_string(),
                guide_id: "c1".to_string(),
                group: "DEP".to_string(),
                stream_url: "http://stream/1".to_string(),
            }]
        );
    }

    #[test]
    fn test_entry_without_url_is_dropped() {
        let text = "#EXTM3U\n#EXTINF:-1,Lost\n#EXTINF:-1,Kept\nacestream://abc\n#EXTINF:-1,Trailing\n";
        let parsed = parse_m3u(text);

        assert_eq!(parsed.channels.len(), 1);
        assert_eq!(parsed.channels[0].name, "Kept");
        assert_eq!(parsed.channels[0].stream_url, "acestream://abc");
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let text = "#EXTM3U\r\n\r\n#EXTINF:-1 group-title=\"DEP\",Uno\r\n#EXTVLCOPT:http-user-agent=VLC\r\n\r\n  http://stream/uno  \r\n# just a comment\r\nhttp://orphan\r\n";
        let parsed = parse_m3u(text);

        assert_eq!(parsed.channels.len(), 1);
        assert_eq!(parsed.channels[0].stream_url, "http://stream/uno");
        assert_eq!(parsed.channels[0].group, "DEP");
    }

    #[test]
    fn test_first_guide_url_wins() {
        let text = "#EXTM3U url-tvg=\"http://first/epg.xml\"\n#EXTM3U url-tvg=\"http://second/epg.xml\"\n";
        assert_eq!(parse_m3u(text).guide_url.as_deref(), Some("http://first/epg.xml"));

        let alt = "#EXTM3U x-tvg-url=\"http://alt/epg.xml\"\n";
        assert_eq!(parse_m3u(alt).guide_url.as_deref(), Some("http://alt/epg.xml"));
    }

    #[test]
    fn test_name_keeps_text_after_first_comma() {
        let parsed = parse_m3u("#EXTINF:-1 group-title=\"X\",Uno, Dos\nhttp://s");
        assert_eq!(parsed.channels[0].name, "Uno, Dos");
    }
}
