//! Error types and handling for Hestia
//!
//! This module defines the error types used throughout the application,
//! providing consistent error handling and reporting.

use thiserror::Error;

/// Result type alias for Hestia operations
pub type Result<T> = std::result::Result<T, HestiaError>;

/// Main error type for Hestia
#[derive(Debug, Error)]
pub enum HestiaError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Unexpected browser/automation backend failures
    #[error("Browser error: {message}")]
    Browser { message: String },

    /// A required page transition target never appeared
    #[error("Navigation error: {message}")]
    Navigation { message: String },

    /// Login completed but the panel did not grant a session
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// An element could not be located on the current page
    #[error("Element not found: {locator}")]
    ElementNotFound { locator: String },

    /// An element exists but cannot be interacted with
    #[error("Element not interactable: {locator}")]
    NotInteractable { locator: String },

    /// Home Assistant API errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Timeout errors
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl HestiaError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        HestiaError::Config {
            message: message.into(),
        }
    }

    /// Create a new browser error
    pub fn browser<S: Into<String>>(message: S) -> Self {
        HestiaError::Browser {
            message: message.into(),
        }
    }

    /// Create a new navigation error
    pub fn navigation<S: Into<String>>(message: S) -> Self {
        HestiaError::Navigation {
            message: message.into(),
        }
    }

    /// Create a new authentication error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        HestiaError::Auth {
            message: message.into(),
        }
    }

    /// Create a new element-not-found error
    pub fn not_found<S: Into<String>>(locator: S) -> Self {
        HestiaError::ElementNotFound {
            locator: locator.into(),
        }
    }

    /// Create a new not-interactable error
    pub fn not_interactable<S: Into<String>>(locator: S) -> Self {
        HestiaError::NotInteractable {
            locator: locator.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        HestiaError::Api {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        HestiaError::Io {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        HestiaError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        HestiaError::Timeout {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        HestiaError::Generic {
            message: message.into(),
        }
    }

    /// Whether this error leaves a single readout key missing rather than
    /// aborting the whole collection cycle.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            HestiaError::ElementNotFound { .. } | HestiaError::NotInteractable { .. }
        )
    }
}

impl From<std::io::Error> for HestiaError {
    fn from(err: std::io::Error) -> Self {
        HestiaError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for HestiaError {
    fn from(err: serde_yaml::Error) -> Self {
        HestiaError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for HestiaError {
    fn from(err: serde_json::Error) -> Self {
        HestiaError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for HestiaError {
    fn from(err: reqwest::Error) -> Self {
        HestiaError::api(err.to_string())
    }
}
