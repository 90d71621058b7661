//! Lineup (channel map) records as supplied by the listings provider

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Response of the lineup channel-map call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineupMapping {
    #[serde(default)]
    pub map: Vec<ChannelMapEntry>,
    #[serde(default)]
    pub stations: Vec<StationDescriptor>,
}

/// Station to channel number assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMapEntry {
    #[serde(rename = "stationID")]
    pub station_id: String,
    #[serde(default)]
    pub channel: Option<String>,
}

/// Station metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationDescriptor {
    #[serde(rename = "stationID")]
    pub station_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub callsign: String,
    #[serde(rename = "broadcastLanguage", default)]
    pub broadcast_language: Vec<String>,
    #[serde(default)]
    pub logo: Option<StationLogo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationLogo {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// A station joined with its channel map entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub station_id: String,
    /// XMLTV channel id, `I{map index}.{stationID}.schedulesdirect.org`
    pub channel_id: String,
    pub name: String,
    pub callsign: String,
    pub channel_number: String,
    pub logo: Option<StationLogo>,
    /// First broadcast language, used as the `lang` fallback
    pub language: Option<String>,
}

impl LineupMapping {
    /// Join `stations` with `map`, keeping station order.
    ///
    /// Stations without a map entry are dropped with a warning.
    pub fn stations(&self) -> Vec<Station> {
        self.stations
            .iter()
            .filter_map(|descriptor| {
                let Some((index, entry)) = self
                    .map
                    .iter()
                    .enumerate()
                    .find(|(_, entry)| entry.station_id == descriptor.station_id)
                else {
                    warn!("Station '{}' has no channel map entry, skipping", descriptor.station_id);
                    return None;
                };

                Some(Station {
                    station_id: descriptor.station_id.clone(),
                    channel_id: format!("I{}.{}.schedulesdirect.org", index, descriptor.station_id),
                    name: descriptor.name.clone(),
                    callsign: descriptor.callsign.clone(),
                    channel_number: normalize_channel_number(entry.channel.as_deref().unwrap_or_default()),
                    logo: descriptor.logo.clone(),
                    language: descriptor.broadcast_language.first().cloned(),
                })
            })
            .collect()
    }
}

/// Strip leading zeros from purely numeric channel numbers (`"002"` -> `"2"`)
pub fn normalize_channel_number(channel: &str) -> String {
    let channel = channel.trim();
    if !channel.is_empty() && channel.chars().all(|c| c.is_ascii_digit()) {
        let trimmed = channel.trim_start_matches('0');
        if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() }
    } else {
        channel.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINEUP_JSON: &str = r#"{
        "map": [
            {"stationID": "20454", "channel": "002"},
            {"stationID": "10021", "channel": "5.1"}
        ],
        "stations": [
            {"stationID": "10021", "name": "WCVB", "callsign": "WCVBDT",
             "broadcastLanguage": ["en"],
             "logo": {"URL": "https://example.org/wcvb.png", "width": 360, "height": 270}},
            {"stationID": "20454", "name": "KOMO", "callsign": "KOMODT"},
            {"stationID": "99999", "name": "Orphan", "callsign": "ORPH"}
        ]
    }"#;

    #[test]
    fn test_stations_join_in_station_order() {
        let lineup: LineupMapping = serde_json::from_str(LINEUP_JSON).unwrap();
        let stations = lineup.stations();

        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].station_id, "10021");
        assert_eq!(stations[0].channel_id, "I1.10021.schedulesdirect.org");
        assert_eq!(stations[0].channel_number, "5.1");
        assert_eq!(stations[0].language.as_deref(), Some("en"));
        assert_eq!(stations[0].logo.as_ref().unwrap().width, Some(360));

        assert_eq!(stations[1].channel_id, "I0.20454.schedulesdirect.org");
        assert_eq!(stations[1].channel_number, "2");
        assert!(stations[1].logo.is_none());
        assert!(stations[1].language.is_none());
    }

    #[test]
    fn test_normalize_channel_number() {
        assert_eq!(normalize_channel_number("002"), "2");
        assert_eq!(normalize_channel_number("000"), "0");
        assert_eq!(normalize_channel_number("12.1"), "12.1");
        assert_eq!(normalize_channel_number(""), "");
    }
}
