//! Listings sources

pub mod schedules_direct;
pub mod traits;

pub use schedules_direct::SchedulesDirectClient;
pub use traits::{ListingsProvider, ServiceInfo};
