//! Error types with actionable diagnostics
//!
//! Every error surfaces before the first training iteration runs: parsing and
//! resolution happen at configuration-validation time, and the clock and its
//! triggers are total once constructed.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for reloj operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing, resolving or binding time values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed, negative, fractional or wrongly-unitted time value.
    #[error("Invalid time value for '{field}': {raw:?} ({reason})\n  → Use an integer, \"<n> <unit>\" or {{number, unit}} with unit one of: {allowed}")]
    InvalidTimeValue { field: String, raw: String, reason: String, allowed: String },

    /// An epoch-valued quantity was resolved before the dataset length was known.
    #[error("Cannot resolve {value} to iterations: dataset length is unknown\n  → Initialize the dataloader before binding epoch-based intervals")]
    UnknownDatasetLength { value: String },

    /// Two time values in different units were compared without a usable run context.
    #[error("Cannot compare {left} with {right}: units differ and no dataset length/batch size is available to resolve them")]
    UnresolvableComparison { left: String, right: String },

    /// Batch size or dataset length is out of range.
    #[error("Invalid run context: {message}")]
    InvalidRunContext { message: String },

    /// Configuration file not found at expected path.
    #[error("Configuration file not found: {path}\n  → Check the path passed on the command line")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file has invalid syntax or shape.
    #[error("Invalid configuration in {path}:\n  {message}")]
    ConfigParsing { path: PathBuf, message: String },

    /// Configuration value is out of range.
    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValue { field: String, message: String },
}

impl Error {
    /// Check if this error is caused by user input rather than a caller bug.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::UnresolvableComparison { .. })
    }

    /// Get the error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTimeValue { .. } => "E101",
            Self::UnknownDatasetLength { .. } => "E201",
            Self::UnresolvableComparison { .. } => "E202",
            Self::InvalidRunContext { .. } => "E203",
            Self::ConfigNotFound { .. } => "E301",
            Self::ConfigParsing { .. } => "E302",
            Self::ConfigValue { .. } => "E303",
        }
    }

    pub(crate) fn config_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValue { field: field.into(), message: message.into() }
    }
}
