//! Episode numbering: the `xmltv_ns` scheme and the run-scoped `dd_progid`

use std::collections::HashMap;

use crate::models::GracenoteNumbering;

pub const SYSTEM_XMLTV_NS: &str = "xmltv_ns";
pub const SYSTEM_DD_PROGID: &str = "dd_progid";

/// `season.episode.part`, each zero-based with an optional `/total`.
///
/// Absent numerators or totals leave their slot empty; the dots are always
/// written, so season 1 of 1 and episode 1 of 1 renders as `0/1.0/1.`.
pub fn xmltv_ns(numbering: &GracenoteNumbering) -> String {
    let segments = [
        (numbering.season, numbering.total_seasons),
        (numbering.episode, numbering.total_episodes),
        (numbering.part, numbering.total_parts),
    ];
    segments
        .iter()
        .map(|(index, total)| {
            let mut segment = String::new();
            if let Some(index) = index {
                segment.push_str(&index.saturating_sub(1).to_string());
            }
            if let Some(total) = total {
                segment.push('/');
                segment.push_str(&total.to_string());
            }
            segment
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Digits needed for the counter: `ceil(log10(max(1, programs)))`
pub fn sequence_width(programs: usize) -> usize {
    let programs = programs.max(1);
    let mut width = 0;
    let mut capacity: usize = 1;
    while capacity < programs {
        capacity = capacity.saturating_mul(10);
        width += 1;
    }
    width
}

/// `{programID}.{counter}` zero-padded to `width`
pub fn dd_progid(program_id: &str, counter: u32, width: usize) -> String {
    format!("{program_id}.{counter:0width$}")
}

/// Per-program counters for one run
#[derive(Debug, Default)]
pub struct ProgramCounters {
    width: usize,
    counts: HashMap<String, u32>,
}

impl ProgramCounters {
    /// Counters padded for a run that fetched `programs` records
    pub fn new(programs: usize) -> Self {
        Self {
            width: sequence_width(programs),
            counts: HashMap::new(),
        }
    }

    /// Identifier for the next rendering of `program_id`; advances its counter
    pub fn next_id(&mut self, program_id: &str) -> String {
        let counter = self.counts.entry(program_id.to_string()).or_insert(0);
        let id = dd_progid(program_id, *counter, self.width);
        *counter += 1;
        id
    }

    /// Identifier the next rendering would receive, without advancing
    pub fn peek_id(&self, program_id: &str) -> String {
        let counter = self.counts.get(program_id).copied().unwrap_or(0);
        dd_progid(program_id, counter, self.width)
    }
}
