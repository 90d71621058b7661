//! Application services

pub mod guide_service;

pub use guide_service::{GuideService, uncached_program_ids};
