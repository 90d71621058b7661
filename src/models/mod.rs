//! Listings records as supplied by the fetch collaborator.
//!
//! These are immutable snapshots for the duration of one run.

pub mod lineup;
pub mod program;
pub mod schedule;

pub use lineup::{LineupMapping, Station, StationLogo};
pub use program::{GracenoteNumbering, ProgramRecord};
pub use schedule::{ScheduleSlot, StationSchedule, flatten_slots};
