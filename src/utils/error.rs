//! Error types for showreel
//!
//! This module defines the error taxonomy used throughout the crate.
//! We use thiserror for the library error type and anyhow at the binary
//! boundary.

use crate::contact::ValidationErrors;
use thiserror::Error;

/// Main error type for showreel
#[derive(Error, Debug)]
pub enum ShowreelError {
    /// The CMS is unreachable or misconfigured. Callers recover by
    /// falling back to the bundled dataset.
    #[error("Content source unavailable: {0}")]
    SourceUnavailable(String),

    /// A required deployment value (CDN base URL, API key) is missing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Playable media failed to load or decode
    #[error("Media load error: {0}")]
    MediaLoad(String),

    /// Contact form field failures
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Outbound HTTP failures
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failures
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O errors
    #[error("File error: {0}")]
    FileIO(#[from] std::io::Error),

    /// Generic error for unexpected situations
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShowreelError {
    /// Whether this error should be absorbed by the static-data fallback
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, ShowreelError::SourceUnavailable(_) | ShowreelError::Http(_))
    }
}

/// Convenience type alias for Results in showreel
pub type Result<T> = std::result::Result<T, ShowreelError>;

/// Extension trait for converting other errors to ShowreelError
pub trait IntoShowreelError<T> {
    /// Convert this error into a ShowreelError with the given context
    fn source_err(self, context: &str) -> Result<T>;
    fn config_err(self, context: &str) -> Result<T>;
    fn media_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoShowreelError<T> for std::result::Result<T, E> {
    fn source_err(self, context: &str) -> Result<T> {
        self.map_err(|e| ShowreelError::SourceUnavailable(format!("{}: {}", context, e)))
    }

    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| ShowreelError::Configuration(format!("{}: {}", context, e)))
    }

    fn media_err(self, context: &str) -> Result<T> {
        self.map_err(|e| ShowreelError::MediaLoad(format!("{}: {}", context, e)))
    }
}
