//! Time utilities for XMLTV timestamps and listings air times

use chrono::{DateTime, Days, FixedOffset, Local, NaiveDate};
use chrono_tz::Tz;

use crate::errors::{AppError, AppResult};

/// XMLTV programme timestamp, e.g. `20240101120000 -0500`
pub const XMLTV_TIME_FORMAT: &str = "%Y%m%d%H%M%S %z";

/// XMLTV date without time, used for `<date>`
pub const XMLTV_DATE_FORMAT: &str = "%Y%m%d";

/// Zone in which programme start/stop attributes are rendered
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputZone {
    /// The host's local zone
    Local,
    Named(Tz),
}

impl OutputZone {
    /// Resolve an IANA zone name such as `America/New_York`
    pub fn named(name: &str) -> AppResult<Self> {
        name.parse::<Tz>()
            .map(Self::Named)
            .map_err(|e| AppError::config(format!("Unknown timezone '{name}': {e}")))
    }

    /// Render an instant as an XMLTV timestamp in this zone
    pub fn format_xmltv(&self, instant: &DateTime<FixedOffset>) -> String {
        match self {
            Self::Local => instant.with_timezone(&Local).format(XMLTV_TIME_FORMAT).to_string(),
            Self::Named(tz) => instant.with_timezone(tz).format(XMLTV_TIME_FORMAT).to_string(),
        }
    }
}

/// Parse a listings air time (`2024-03-01T19:30:00Z` or `...+0000`)
pub fn parse_air_date_time(value: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
}

/// Parse an `originalAirDate` value (`YYYY-MM-DD`)
pub fn parse_original_air_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
}

/// Consecutive `YYYY-MM-DD` dates starting at `first`
pub fn schedule_dates(first: NaiveDate, days: u32) -> Vec<String> {
    (0..days)
        .filter_map(|offset| first.checked_add_days(Days::new(u64::from(offset))))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect()
}
