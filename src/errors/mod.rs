//! Centralized error handling for the guide generator
//!
//! # Error Categories
//!
//! - **Source Errors**: listings provider connectivity, status codes, auth
//! - **XML Errors**: reading the guide document written by a previous run
//! - **Mapping Errors**: per-slot failures, always recovered by skipping the slot
//!
//! # Usage
//!
//! ```rust
//! use sd_xmltv::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for listings provider Results
pub type SourceResult<T> = Result<T, SourceError>;

/// Convenience type alias for guide document Results
pub type XmlResult<T> = Result<T, XmlError>;
