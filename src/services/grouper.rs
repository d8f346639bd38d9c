use chrono::Utc;
use deunicode::deunicode;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;

use crate::models::{
    ChannelEntry, ChannelGroup, ChannelView, GroupedChannel, GuideFeed, StreamVariant,
    NO_PROGRAMME,
};
use crate::services::epg::{current_programme_at, now_key};

/// Groups shown first, in this order
pub const PRIORITY_GROUPS: [&str; 3] = ["LA LIGA", "LIGA DE CAMPEONES", "F1"];

const F1_GROUP: &str = "F1";

lazy_static! {
    /// Formula 1 channels are pulled into their own group
    static ref F1_NAME: Regex = Regex::new(r"(?i)f1|formula 1").unwrap();

    /// Quality markers and parenthesized suffixes. Only the first match is
    /// removed.
    static ref QUALITY_MARKER: Regex =
        Regex::new(r"(?i)\s*\(.*?\)|\s*\d+p|\s*FHD|\s*HD|\s*SD").unwrap();
}

/// Builds the grouped lineup from parsed entries and the guide
pub struct ChannelGrouper;

impl ChannelGrouper {
    /// Group a channel belongs to, after the Formula 1 override
    pub fn resolve_group(channel: &ChannelEntry) -> &str {
        if F1_NAME.is_match(&channel.name) {
            F1_GROUP
        } else {
            &channel.group
        }
    }

    /// Name without its quality marker, used as grouping key and label
    pub fn base_name(name: &str) -> String {
        QUALITY_MARKER.replace(name, "").trim().to_string()
    }

    /// Priority groups first in their fixed order, everything else after,
    /// alphabetically.
    pub fn compare_groups(a: &str, b: &str) -> Ordering {
        let rank = |name: &str| PRIORITY_GROUPS.iter().position(|p| *p == name);
        match (rank(a), rank(b)) {
            (Some(ra), Some(rb)) => ra.cmp(&rb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Self::collate(a, b),
        }
    }

    /// Accent and case insensitive comparison, ties broken by the raw text
    fn collate(a: &str, b: &str) -> Ordering {
        let key_a = deunicode(a).to_lowercase();
        let key_b = deunicode(b).to_lowercase();
        key_a.cmp(&key_b).then_with(|| a.cmp(b))
    }

    /// Group channels at the current instant
    pub fn group(channels: &[ChannelEntry], guide: &GuideFeed) -> ChannelView {
        Self::group_at(channels, guide, &now_key())
    }

    /// Group channels using `now` (14-digit UTC key) to pick programmes.
    ///
    /// Entries sharing group, base name and current programme become
    /// variants of one [`GroupedChannel`]; the first entry seeds logo, id
    /// and name. Channels keep first-seen order inside a group.
    pub fn group_at(channels: &[ChannelEntry], guide: &GuideFeed, now: &str) -> ChannelView {
        let mut groups: IndexMap<String, IndexMap<String, GroupedChannel>> = IndexMap::new();

        for channel in channels {
            let group = Self::resolve_group(channel);
            let base_name = Self::base_name(&channel.name);
            let programme = current_programme_at(guide, &channel.guide_id, now)
                .map(|p| p.title.as_str())
                .unwrap_or(NO_PROGRAMME);
            let key = format!("{}-{}", base_name, programme);

            let grouped = groups
                .entry(group.to_string())
                .or_default()
                .entry(key.clone())
                .or_insert_with(|| GroupedChannel {
                    key,
                    logo_url: channel.logo_url.clone(),
                    guide_id: channel.guide_id.clone(),
                    base_name,
                    current_programme: programme.to_string(),
                    variants: Vec::new(),
                });

            grouped.variants.push(StreamVariant {
                label: channel.name.clone(),
                stream_url: channel.stream_url.clone(),
            });
        }

        groups.sort_by(|a, _, b, _| Self::compare_groups(a, b));

        let groups: Vec<ChannelGroup> = groups
            .into_iter()
            .map(|(name, channels)| ChannelGroup {
                name,
                channels: channels.into_values().collect(),
            })
            .collect();

        tracing::debug!(
            entries = channels.len(),
            groups = groups.len(),
            "Channels grouped"
        );

        ChannelView {
            groups,
            entry_count: channels.len(),
            guide_channels: guide.channel_count(),
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Programme, DEFAULT_GROUP, PLACEHOLDER_LOGO};

    fn entry(name: &str, id: &str, group: &str, url: &str) -> ChannelEntry {
        ChannelEntry {
            name: name.to_string(),
            logo_url: PLACEHOLDER_LOGO.to_string(),
            guide_id: id.to_string(),
            group: group.to_string(),
            stream_url: url.to_string(),
        }
    }

    fn group_names(view: &ChannelView) -> Vec<&str> {
        view.groups.iter().map(|g| g.name.as_str()).collect()
    }

    #[test]
    fn test_base_name() {
        assert_eq!(ChannelGrouper::base_name("Canal Uno HD"), "Canal Uno");
        assert_eq!(ChannelGrouper::base_name("DAZN 1 FHD"), "DAZN 1");
        assert_eq!(ChannelGrouper::base_name("Movistar LaLiga 1080p"), "Movistar LaLiga");
        assert_eq!(ChannelGrouper::base_name("Eurosport (backup)"), "Eurosport");
        assert_eq!(ChannelGrouper::base_name("La 2 sd"), "La 2");
        assert_eq!(ChannelGrouper::base_name("  Teledeporte  "), "Teledeporte");
        assert_eq!(ChannelGrouper::base_name(""), "");
    }

    #[test]
    fn test_base_name_removes_first_marker_only() {
        assert_eq!(ChannelGrouper::base_name("Canal 720p (alt)"), "Canal (alt)");
    }

    #[test]
    fn test_base_name_is_idempotent() {
        for name in [
            "Canal Uno HD",
            "DAZN 1 FHD",
            "Movistar LaLiga 1080p",
            "Eurosport (backup)",
            "Teledeporte",
            "",
        ] {
            let once = ChannelGrouper::base_name(name);
            assert_eq!(ChannelGrouper::base_name(&once), once, "name: {}", name);
        }
    }

    #[test]
    fn test_f1_override() {
        let f1 = entry("DAZN F1 1080p", "", "DEPORTES", "http://s/1");
        let formula = entry("Sky Formula 1", "", "DEPORTES", "http://s/2");
        let other = entry("Canal Uno", "", "DEPORTES", "http://s/3");

        assert_eq!(ChannelGrouper::resolve_group(&f1), "F1");
        assert_eq!(ChannelGrouper::resolve_group(&formula), "F1");
        assert_eq!(ChannelGrouper::resolve_group(&other), "DEPORTES");
    }

    #[test]
    fn test_group_ordering() {
        let channels = vec![
            entry("Uno", "", "OTROS", "http://s/1"),
            entry("DAZN F1", "", "DEP", "http://s/2"),
            entry("Dos", "", "ZZZ", "http://s/3"),
            entry("Tres", "", "LA LIGA", "http://s/4"),
        ];
        let view = ChannelGrouper::group_at(&channels, &GuideFeed::new(), "20240101000000");
        assert_eq!(group_names(&view), vec!["LA LIGA", "F1", "OTROS", "ZZZ"]);
    }

    #[test]
    fn test_compare_groups() {
        assert_eq!(ChannelGrouper::compare_groups("F1", "LA LIGA"), Ordering::Greater);
        assert_eq!(ChannelGrouper::compare_groups("LIGA DE CAMPEONES", "AAA"), Ordering::Less);
        assert_eq!(ChannelGrouper::compare_groups("Éxitos", "Fútbol"), Ordering::Less);
        assert_eq!(ChannelGrouper::compare_groups("cine", "DEPORTES"), Ordering::Less);
    }

    #[test]
    fn test_variants_merge_by_base_name_and_programme() {
        let channels = vec![
            entry("Canal Uno HD", "c1", "DEP", "http://s/hd"),
            entry("Canal Dos", "c2", "DEP", "http://s/dos"),
            entry("Canal Uno SD", "c1", "DEP", "http://s/sd"),
            entry("Canal Uno 720p", "c1", "OTHER", "http://s/720"),
        ];
        let view = ChannelGrouper::group_at(&channels, &GuideFeed::new(), "20240101000000");

        let dep = view.group("DEP").unwrap();
        assert_eq!(dep.channels.len(), 2);
        assert_eq!(dep.channels[0].base_name, "Canal Uno");
        assert_eq!(dep.channels[0].current_programme, NO_PROGRAMME);
        let labels: Vec<&str> = dep.channels[0].variants.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["Canal Uno HD", "Canal Uno SD"]);
        assert_eq!(dep.channels[1].base_name, "Canal Dos");

        assert_eq!(view.group("OTHER").unwrap().channels[0].variants.len(), 1);
    }

    #[test]
    fn test_different_programmes_stay_apart() {
        let mut guide = GuideFeed::new();
        guide.push(
            "a",
            Programme {
                start: "20240101000000".to_string(),
                stop: "20240101020000".to_string(),
                title: "Partido".to_string(),
            },
        );
        let channels = vec![
            entry("Canal HD", "a", "DEP", "http://s/1"),
            entry("Canal SD", "b", "DEP", "http://s/2"),
        ];
        let view = ChannelGrouper::group_at(&channels, &guide, "20240101010000");

        let dep = view.group("DEP").unwrap();
        assert_eq!(dep.channels.len(), 2);
        assert_eq!(dep.channels[0].current_programme, "Partido");
        assert_eq!(dep.channels[0].key, "Canal-Partido");
        assert_eq!(dep.channels[1].current_programme, NO_PROGRAMME);
        assert_eq!(view.guide_channels, 1);
    }

    #[test]
    fn test_first_entry_seeds_group_fields() {
        let mut first = entry("Canal HD", "id1", "DEP", "http://s/1");
        first.logo_url = "http://logo/1.png".to_string();
        let mut second = entry("Canal SD", "id2", "DEP", "http://s/2");
        second.logo_url = "http://logo/2.png".to_string();

        let view = ChannelGrouper::group_at(&[first, second], &GuideFeed::new(), "20240101000000");
        let grouped = &view.groups[0].channels[0];
        assert_eq!(grouped.logo_url, "http://logo/1.png");
        assert_eq!(grouped.guide_id, "id1");
        assert_eq!(grouped.variants.len(), 2);
    }

    #[test]
    fn test_grouping_is_a_partition() {
        let channels = vec![
            entry("A HD", "", DEFAULT_GROUP, "http://s/1"),
            entry("A SD", "", DEFAULT_GROUP, "http://s/2"),
            entry("B", "", "LA LIGA", "http://s/3"),
            entry("F1 Live", "", "LA LIGA", "http://s/4"),
            entry("C (backup)", "", "ZZZ", "http://s/5"),
            entry("C", "", "ZZZ", "http://s/5"),
        ];
        let view = ChannelGrouper::group_at(&channels, &GuideFeed::new(), "20240101000000");

        let mut seen: Vec<(&str, &str)> = view
            .groups
            .iter()
            .flat_map(|g| g.channels.iter())
            .flat_map(|c| c.variants.iter())
            .map(|v| (v.label.as_str(), v.stream_url.as_str()))
            .collect();
        seen.sort();
        let mut expected: Vec<(&str, &str)> = channels
            .iter()
            .map(|c| (c.name.as_str(), c.stream_url.as_str()))
            .collect();
        expected.sort();

        assert_eq!(seen, expected);
        assert_eq!(view.entry_count, channels.len());
        assert!(view
            .groups
            .iter()
            .flat_map(|g| g.channels.iter())
            .all(|c| !c.variants.is_empty()));
    }

    #[test]
    fn test_end_to_end_grouping() {
        let parsed = crate::services::m3u_parser::parse_m3u(
            "#EXTM3U url-tvg=\"http://x/epg.xml\"\n#EXTINF:-1 tvg-id=\"c1\" group-title=\"DEP\",Canal Uno HD\nhttp://stream/1",
        );
        let view = ChannelGrouper::group(&parsed.channels, &GuideFeed::new());

        assert_eq!(group_names(&view), vec!["DEP"]);
        let grouped = &view.groups[0].channels[0];
        assert_eq!(grouped.base_name, "Canal Uno");
        assert_eq!(grouped.current_programme, NO_PROGRAMME);
        assert_eq!(
            grouped.variants,
            vec![StreamVariant {
                label: "Canal Uno HD".to_string(),
                stream_url: "http://stream/1".to_string(),
            }]
        );
    }

    #[test]
    fn test_entries_without_guide_id_get_no_programme() {
        let guide = crate::services::epg::parse_xmltv(
            "<tv><programme start=\"20240101000000\" stop=\"20240101010000\"><title>Ghost</title></programme></tv>",
        )
        .unwrap();
        let channels = vec![
            entry("Canal A", "", "DEP", "http://a"),
            entry("Canal B", "", "DEP", "http://b"),
        ];

        let view = ChannelGrouper::group_at(&channels, &guide, "20240101003000");
        let dep = view.group("DEP").unwrap();
        assert_eq!(dep.channels.len(), 2);
        assert!(dep
            .channels
            .iter()
            .all(|c| c.current_programme == NO_PROGRAMME));
    }
}
