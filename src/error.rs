// src/error.rs

//! Unified error handling for the digest application.

use std::fmt;

use thiserror::Error;

/// Result type alias for digest operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote thread source rejected our credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Thread listing failed
    #[error("Fetch error for {context}: {message}")]
    Fetch { context: String, message: String },

    /// Attachment transfer failed
    #[error("Download failed for {url}: {message}")]
    Download { url: String, message: String },

    /// Document rendering failed
    #[error("Transcription failed for {path}: {message}")]
    Transcribe { path: String, message: String },

    /// A thread record is missing required fields
    #[error("Malformed thread {thread}: {message}")]
    Malformed { thread: String, message: String },

    /// Insight summarization failed
    #[error("Summarizer error: {0}")]
    Summarize(String),
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

    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create a fetch error with context.
    pub fn fetch(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a download error for a URL.
    pub fn download(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Download {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a transcription error for a file.
    pub fn transcribe(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transcribe {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed-record error for a thread.
    pub fn malformed(thread: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Malformed {
            thread: thread.into(),
            message: message.to_string(),
        }
    }

    /// Create a summarizer error.
    pub fn summarize(message: impl fmt::Display) -> Self {
        Self::Summarize(message.to_string())
    }

    /// Whether this error should abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Config(_))
    }
}
