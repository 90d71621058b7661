//! Listings to XMLTV transformation and the incremental programme cache

pub mod assembler;
pub mod cache;
pub mod episode;
pub mod mapper;
pub mod roles;

pub use assembler::{Assembly, AssemblyStats, DocumentAssembler, channel_element};
pub use cache::ProgramCache;
pub use episode::{ProgramCounters, dd_progid, sequence_width, xmltv_ns};
pub use mapper::{AudioFlag, FieldMapper, Programme, ProgrammeTiming};
pub use roles::{CreditRole, classify_role};
