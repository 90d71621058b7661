//! Guide document assembly
//!
//! Channels are written in lineup order, then one programme per schedule slot
//! in provider order. Each slot resolves to either a cached programme rebased
//! onto the slot's timing, or a fresh rendering of its program record.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::cache::ProgramCache;
use super::episode::ProgramCounters;
use super::mapper::{FieldMapper, ProgrammeTiming};
use crate::errors::MappingError;
use crate::models::{ProgramRecord, ScheduleSlot, Station, StationSchedule, flatten_slots};
use crate::utils::OutputZone;
use crate::xmltv::{GuideDocument, XmlElement};

/// Counts reported after assembly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub channels: usize,
    pub rendered: usize,
    pub cache_hits: usize,
    pub skipped: usize,
}

impl AssemblyStats {
    pub fn programmes(&self) -> usize {
        self.rendered + self.cache_hits
    }
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub document: GuideDocument,
    pub stats: AssemblyStats,
}

/// Builds a guide document from fetched listings and the prior run's cache
pub struct DocumentAssembler<'a> {
    cache: &'a ProgramCache,
    mapper: FieldMapper,
    zone: OutputZone,
}

enum Resolved {
    CacheHit(XmlElement),
    Rendered(XmlElement),
}

impl<'a> DocumentAssembler<'a> {
    /// Rendered programmes carry the cache's keyword prefix
    pub fn new(cache: &'a ProgramCache, zone: OutputZone) -> Self {
        Self {
            cache,
            mapper: FieldMapper::new(cache.prefix()),
            zone,
        }
    }

    pub fn assemble(
        &self,
        stations: &[Station],
        schedules: &[StationSchedule],
        programs: &[ProgramRecord],
    ) -> Assembly {
        let mut document = GuideDocument::new();
        let mut stats = AssemblyStats::default();

        for station in stations {
            document.push(channel_element(station));
            stats.channels += 1;
        }

        let stations_by_id: HashMap<&str, &Station> =
            stations.iter().map(|s| (s.station_id.as_str(), s)).collect();
        let mut programs_by_id: HashMap<&str, &ProgramRecord> = HashMap::with_capacity(programs.len());
        for record in programs {
            programs_by_id.entry(record.program_id.as_str()).or_insert(record);
        }
        let mut counters = ProgramCounters::new(programs.len());
        let mut rendered: HashMap<String, XmlElement> = HashMap::new();

        for slot in flatten_slots(schedules) {
            match self.resolve(&slot, &stations_by_id, &programs_by_id, &mut counters, &mut rendered) {
                Ok(Resolved::CacheHit(element)) => {
                    document.push(element);
                    stats.cache_hits += 1;
                }
                Ok(Resolved::Rendered(element)) => {
                    document.push(element);
                    stats.rendered += 1;
                }
                Err(err) => {
                    warn!(
                        "Skipping schedule slot for program '{}' ({}): {}",
                        slot.program_id,
                        err.subject(),
                        err
                    );
                    stats.skipped += 1;
                }
            }
        }

        debug!(
            "Assembled guide: channels={} rendered={} cache_hits={} skipped={}",
            stats.channels, stats.rendered, stats.cache_hits, stats.skipped
        );
        Assembly { document, stats }
    }

    fn resolve(
        &self,
        slot: &ScheduleSlot,
        stations: &HashMap<&str, &Station>,
        programs: &HashMap<&str, &ProgramRecord>,
        counters: &mut ProgramCounters,
        rendered: &mut HashMap<String, XmlElement>,
    ) -> Result<Resolved, MappingError> {
        let station = stations
            .get(slot.station_id.as_str())
            .ok_or_else(|| MappingError::UnknownStation {
                station_id: slot.station_id.clone(),
            })?;
        let timing = ProgrammeTiming::for_slot(slot, station, &self.zone)?;

        // Hashes rendered earlier in this run reuse that body like a prior-run hit
        let cached = self
            .cache
            .lookup(&slot.content_hash)
            .or_else(|| rendered.get(&slot.content_hash));
        if let Some(cached) = cached {
            let mut element = cached.clone();
            timing.rebase(&mut element);
            return Ok(Resolved::CacheHit(element));
        }

        let record = programs
            .get(slot.program_id.as_str())
            .ok_or_else(|| MappingError::MissingProgram {
                hash: slot.content_hash.clone(),
                program_id: slot.program_id.clone(),
            })?;

        // The counter only advances once the programme is actually rendered
        let dd_progid = counters.peek_id(&record.program_id);
        let programme = self.mapper.map(slot, record, station, timing, dd_progid)?;
        counters.next_id(&record.program_id);
        let element = programme.to_element();
        rendered.insert(slot.content_hash.clone(), element.clone());
        Ok(Resolved::Rendered(element))
    }
}

/// `<channel>` with display names `"{number} {name}"`, callsign, number
pub fn channel_element(station: &Station) -> XmlElement {
    let mut channel = XmlElement::new("channel")
        .with_attr("id", station.channel_id.as_str())
        .with_child(
            XmlElement::new("display-name").with_text(format!("{} {}", station.channel_number, station.name)),
        )
        .with_child(XmlElement::new("display-name").with_text(station.callsign.as_str()))
        .with_child(XmlElement::new("display-name").with_text(station.channel_number.as_str()));

    if let Some(logo) = &station.logo {
        let mut icon = XmlElement::new("icon").with_attr("src", logo.url.as_str());
        if let Some(width) = logo.width {
            icon.set_attr("width", width.to_string());
        }
        if let Some(height) = logo.height {
            icon.set_attr("height", height.to_string());
        }
        channel.push(icon);
    }
    channel
}
