//! Error types for xsdmap
//!
//! Errors only travel inside the library and to the CLI. The boundary calls
//! (`parse_schema`, `extract_dependencies`, `classify_roles`) fold every
//! failure into an empty result instead of returning one of these.

use std::fmt;
use thiserror::Error;

/// Result type alias using xsdmap Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xsdmap operations
#[derive(Error, Debug)]
pub enum Error {
    /// Schema structure error (e.g. no schema root)
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// XML well-formedness error
    #[error("XML error: {0}")]
    Xml(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Schema structure error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema text
    pub location: Option<String>,
    /// Schema source that caused the error
    pub source: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        if let Some(ref src) = self.source {
            write!(f, "\n\nSource:\n{}", src)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}
