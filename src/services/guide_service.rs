//! Guide generation service
//!
//! Drives one complete run: load the prior guide as a cache, fetch listings,
//! request only the programs the cache cannot serve, assemble and write.

use std::collections::HashSet;
use std::time::Instant;

use chrono::Local;
use tracing::info;

use crate::config::Config;
use crate::epg::{AssemblyStats, DocumentAssembler, ProgramCache};
use crate::errors::AppResult;
use crate::models::StationSchedule;
use crate::sources::ListingsProvider;
use crate::utils::time::schedule_dates;

pub struct GuideService<P> {
    provider: P,
    config: Config,
}

impl<P: ListingsProvider> GuideService<P> {
    pub fn new(provider: P, config: Config) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run the full pipeline and write the guide document
    pub async fn generate(&self) -> AppResult<AssemblyStats> {
        let started = Instant::now();
        let output = &self.config.output;
        let zone = output.zone()?;

        let cache = ProgramCache::load(&output.xmltv_file, output.cache_keyword_prefix.as_str())?;

        let lineup = self.provider.channel_mapping(&self.config.service.lineup).await?;
        let stations = lineup.stations();
        let station_ids: Vec<String> = lineup.map.iter().map(|entry| entry.station_id.clone()).collect();
        let dates = schedule_dates(Local::now().date_naive(), self.config.fetch.days);

        let schedules = self.provider.schedules(&station_ids, &dates).await?;
        let program_ids = uncached_program_ids(&schedules, &cache);
        let programs = if program_ids.is_empty() {
            Vec::new()
        } else {
            self.provider.programs(&program_ids).await?
        };

        let assembly = DocumentAssembler::new(&cache, zone).assemble(&stations, &schedules, &programs);
        assembly.document.write_atomic(&output.xmltv_file)?;

        let stats = assembly.stats;
        info!(
            "Guide written: channels={} rendered={} cache_hits={} skipped={} elapsed={}",
            stats.channels,
            stats.rendered,
            stats.cache_hits,
            stats.skipped,
            humantime::format_duration(started.elapsed())
        );
        Ok(stats)
    }
}

/// Distinct program ids, in first-seen order, of slots whose hash is not cached
pub fn uncached_program_ids(schedules: &[StationSchedule], cache: &ProgramCache) -> Vec<String> {
    let mut seen = HashSet::new();
    schedules
        .iter()
        .flat_map(|schedule| schedule.programs.iter())
        .filter(|entry| !cache.contains(&entry.md5))
        .filter(|entry| seen.insert(entry.program_id.as_str()))
        .map(|entry| entry.program_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmltv::{GuideDocument, XmlElement};

    #[test]
    fn test_uncached_program_ids_skip_cached_hashes() {
        let schedules: Vec<StationSchedule> = serde_json::from_str(
            r#"[
                {"stationID": "1", "programs": [
                    {"programID": "EP2", "md5": "h2", "airDateTime": "2024-01-01T00:00:00Z", "duration": 60},
                    {"programID": "EP1", "md5": "h1", "airDateTime": "2024-01-01T00:01:00Z", "duration": 60}
                ]},
                {"stationID": "2", "programs": [
                    {"programID": "EP2", "md5": "h2b", "airDateTime": "2024-01-01T00:00:00Z", "duration": 60},
                    {"programID": "EP3", "md5": "h3", "airDateTime": "2024-01-01T00:01:00Z", "duration": 60}
                ]}
            ]"#,
        )
        .unwrap();

        let mut prior = GuideDocument::new();
        prior.push(XmlElement::new("programme").with_child(XmlElement::new("keyword").with_text("sd-md5-h1")));
        let cache = ProgramCache::from_document(&prior, "sd-md5-");

        assert_eq!(uncached_program_ids(&schedules, &cache), vec!["EP2", "EP3"]);
    }
}
