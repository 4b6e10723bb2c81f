//! Result and error types for Folio.

use thiserror::Error;

/// Result type for Folio operations
pub type FolioResult<T> = Result<T, FolioError>;

/// Errors that can occur in Folio
#[derive(Debug, Error)]
pub enum FolioError {
    /// A required marker attribute is absent from a target
    #[error("Missing attribute `{attribute}` on target")]
    MissingAttribute {
        /// Attribute name
        attribute: String,
    },

    /// A marker attribute is present but its value is unusable
    #[error("Invalid value `{value}` for attribute `{attribute}`")]
    InvalidAttribute {
        /// Attribute name
        attribute: String,
        /// Raw attribute value
        value: String,
    },

    /// Intersection threshold outside [0, 1]
    #[error("Threshold {threshold} is outside [0, 1]")]
    InvalidThreshold {
        /// Rejected threshold
        threshold: f64,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Host document or platform failure
    #[error("Host error: {message}")]
    Host {
        /// Error message
        message: String,
    },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FolioError {
    /// Create a missing attribute error
    #[must_use]
    pub fn missing_attribute(attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            attribute: attribute.into(),
        }
    }

    /// Create an invalid attribute error
    #[must_use]
    pub fn invalid_attribute(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a host error
    #[must_use]
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }
}
