// src/error.rs

//! Unified error handling for the mirror application.

use std::fmt;

use thiserror::Error;

/// Result type alias for mirror operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (transport error or non-2xx status)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request kept timing out after exhausting the retry budget
    #[error("request to {url} timed out after {attempts} attempts")]
    Timeout { url: String, attempts: u32 },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// XML parsing failed
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Report payload did not have the expected shape
    #[error("Report error for {context}: {message}")]
    Report { context: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a report error with context.
    pub fn report(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Report {
            context: context.into(),
            message: message.to_string(),
        }
    }
}
