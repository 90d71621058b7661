//! Listings provider trait definitions
//!
//! The guide pipeline only needs fully materialized, typed listings. The
//! informational calls return raw JSON since they are only ever displayed.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SourceResult;
use crate::models::{LineupMapping, ProgramRecord, StationSchedule};

/// Fetches the three listings collections the guide is built from
#[async_trait]
pub trait ListingsProvider: Send + Sync {
    /// Channel map and station descriptors of a lineup
    async fn channel_mapping(&self, lineup: &str) -> SourceResult<LineupMapping>;

    /// Schedules for the given stations over `dates` (`YYYY-MM-DD`)
    async fn schedules(&self, station_ids: &[String], dates: &[String]) -> SourceResult<Vec<StationSchedule>>;

    /// Program metadata records for the given program ids
    async fn programs(&self, program_ids: &[String]) -> SourceResult<Vec<ProgramRecord>>;
}

/// Account and discovery calls exposed on the command line
#[async_trait]
pub trait ServiceInfo: Send + Sync {
    async fn status(&self) -> SourceResult<Value>;

    async fn lineups(&self) -> SourceResult<Value>;

    async fn headends(&self, country: &str, postal_code: &str) -> SourceResult<Value>;

    /// Available services, or the details of one service when named
    async fn available(&self, service: Option<&str>) -> SourceResult<Value>;
}
