//! Per-station schedule records

use serde::{Deserialize, Serialize};

/// One station's schedule for the requested dates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationSchedule {
    #[serde(rename = "stationID")]
    pub station_id: String,
    #[serde(default)]
    pub programs: Vec<ScheduleEntry>,
}

/// A single airing as it appears in the schedule response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(rename = "programID")]
    pub program_id: String,
    /// Listing version digest, the cache key
    pub md5: String,
    /// ISO-8601 with offset, parsed at assembly time
    #[serde(rename = "airDateTime")]
    pub air_date_time: String,
    /// Seconds
    pub duration: i64,
}

/// A schedule entry bound to its station
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub station_id: String,
    pub program_id: String,
    pub content_hash: String,
    pub air_start: String,
    pub duration_seconds: i64,
}

impl StationSchedule {
    /// Slots in provider order
    pub fn slots(&self) -> impl Iterator<Item = ScheduleSlot> + '_ {
        self.programs.iter().map(|entry| ScheduleSlot {
            station_id: self.station_id.clone(),
            program_id: entry.program_id.clone(),
            content_hash: entry.md5.clone(),
            air_start: entry.air_date_time.clone(),
            duration_seconds: entry.duration,
        })
    }
}

/// Flatten schedules into slots, per station then per entry
pub fn flatten_slots(schedules: &[StationSchedule]) -> Vec<ScheduleSlot> {
    schedules.iter().flat_map(StationSchedule::slots).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_keeps_provider_order() {
        let json = r#"[
            {"stationID": "1", "programs": [
                {"programID": "EP1", "md5": "a", "airDateTime": "2024-01-01T00:00:00Z", "duration": 1800},
                {"programID": "EP2", "md5": "b", "airDateTime": "2024-01-01T00:30:00Z", "duration": 3600}
            ]},
            {"stationID": "2", "programs": [
                {"programID": "EP1", "md5": "a", "airDateTime": "2024-01-01T00:00:00Z", "duration": 1800, "new": true}
            ]}
        ]"#;
        let schedules: Vec<StationSchedule> = serde_json::from_str(json).unwrap();
        let slots = flatten_slots(&schedules);

        let keys: Vec<_> = slots
            .iter()
            .map(|s| (s.station_id.as_str(), s.program_id.as_str()))
            .collect();
        assert_eq!(keys, vec![("1", "EP1"), ("1", "EP2"), ("2", "EP1")]);
        assert_eq!(slots[1].duration_seconds, 3600);
        assert_eq!(slots[2].content_hash, "a");
    }
}
