//! Error types for the dosage_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dosage_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A dosage or medication was constructed with an invalid field value
    #[error("Validation error: {0}")]
    Validation(String),

    /// An external row or object does not describe exactly one dosage variant
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
