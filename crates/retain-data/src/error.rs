//! Error types for record ingestion.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while turning raw input into customer records.
#[derive(Debug, Error)]
pub enum DataError {
    /// Required columns are absent from a batch header
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A required field is absent or empty
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A field could not be converted to its declared type
    #[error("Invalid value {value:?} for field {field}: expected {expected}")]
    InvalidField {
        /// Field name
        field: String,
        /// Offending raw value
        value: String,
        /// Expected type description
        expected: &'static str,
    },

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Build an [`DataError::InvalidField`].
    pub fn invalid(field: &str, value: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            value: value.into(),
            expected,
        }
    }

    /// Whether the error affects a single record rather than the whole input.
    pub const fn is_row_level(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::InvalidField { .. })
    }
}
