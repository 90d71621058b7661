//! Schedules Direct listings to XMLTV guide generator
//!
//! Listings are fetched from the Schedules Direct JSON service and rendered
//! into an XMLTV document. Programmes whose listing digest is unchanged since
//! the previous run are carried forward from the prior document rather than
//! rendered again.

pub mod config;
pub mod epg;
pub mod errors;
pub mod models;
pub mod services;
pub mod sources;
pub mod utils;
pub mod xmltv;

pub use config::Config;
pub use errors::{AppError, AppResult};
