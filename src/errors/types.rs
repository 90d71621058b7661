//! Error type definitions for the guide generator
//!
//! The hierarchy mirrors the three layers of a run: fetching listings from the
//! provider, reading the previously written guide document, and mapping
//! individual schedule slots into programme elements.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Listings provider errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Errors reading a previously written guide document
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// Errors mapping a single schedule slot
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised by the listings provider client
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport level failures
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status codes
    #[error("HTTP status {status} from {endpoint}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// Token request failures
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Response bodies that do not have the expected shape
    #[error("Invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },
}

/// Errors raised while reading a guide document
#[derive(Error, Debug)]
pub enum XmlError {
    /// Underlying tokenizer failure
    #[error("XML parse error at byte {position}: {message}")]
    Parse { position: u64, message: String },

    /// Mismatched or missing end tags
    #[error("Unbalanced element: {element}")]
    Unbalanced { element: String },

    /// Escape sequences that cannot be resolved
    #[error("Invalid escape sequence: {0}")]
    Escape(String),
}

/// Per-slot mapping failures
///
/// None of these abort a run; the assembler downgrades every variant to a
/// skipped slot with a warning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("Malformed air time '{value}' for hash '{hash}': {message}")]
    MalformedTimestamp {
        hash: String,
        value: String,
        message: String,
    },

    #[error("Malformed date '{value}' for program '{program_id}': {message}")]
    MalformedDate {
        program_id: String,
        value: String,
        message: String,
    },

    #[error("No lineup entry for station '{station_id}'")]
    UnknownStation { station_id: String },

    #[error("No program data for hash '{hash}' or program id '{program_id}'")]
    MissingProgram { hash: String, program_id: String },
}

impl AppError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        Self::config(err.to_string())
    }
}

impl SourceError {
    /// Create a status error for an endpoint
    pub fn status<E: Into<String>, M: Into<String>>(endpoint: E, status: u16, message: M) -> Self {
        Self::Status {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    /// Create an authentication failed error
    pub fn auth_failed<M: Into<String>>(message: M) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response<E: Into<String>, M: Into<String>>(endpoint: E, message: M) -> Self {
        Self::InvalidResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

impl MappingError {
    /// Content hash or program id the failure relates to, for log lines
    pub fn subject(&self) -> &str {
        match self {
            Self::MalformedTimestamp { hash, .. } => hash,
            Self::MalformedDate { program_id, .. } => program_id,
            Self::UnknownStation { station_id } => station_id,
            Self::MissingProgram { hash, .. } => hash,
        }
    }
}
