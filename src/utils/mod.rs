//! Utility modules shared across the guide generator

pub mod latin1;
pub mod time;

pub use time::{OutputZone, XMLTV_DATE_FORMAT, XMLTV_TIME_FORMAT};
