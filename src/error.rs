//! Error handling for calibration search operations.
//!
//! Provides error types with context for catalog loading, archive metadata
//! parsing, configuration validation and report output.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalibError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration file: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Standard star catalog unavailable at {path}: {reason}")]
    CatalogUnavailable { path: PathBuf, reason: String },

    #[error("Invalid angle '{value}': {reason}")]
    InvalidAngle { value: String, reason: String },

    #[error("No archive inventory for {date}: {reason}")]
    InventoryUnavailable { date: NaiveDate, reason: String },

    #[error("Malformed metadata table {path}: {reason}")]
    MetadataFormat { path: PathBuf, reason: String },

    #[error("Invalid observation date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },
}

impl CalibError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a catalog error for the given source path
    pub fn catalog(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CatalogUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an inventory error for a single date
    pub fn unavailable(date: NaiveDate, reason: impl Into<String>) -> Self {
        Self::InventoryUnavailable {
            date,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalibError>;
