//! Error types for feature engineering.

use thiserror::Error;

/// Errors raised while validating or transforming a raw batch.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A required raw column is absent
    #[error("Missing required column: {column}")]
    MissingColumn {
        /// Column name
        column: String,
    },

    /// A raw column has a dtype that cannot represent its declared type
    #[error("Invalid column {column}: expected {expected}, found {found}")]
    InvalidColumn {
        /// Column name
        column: String,
        /// Expected dtype class
        expected: &'static str,
        /// Actual dtype
        found: String,
    },

    /// A column that must not be present in this context was supplied
    #[error("Unexpected column {column}: {reason}")]
    UnexpectedColumn {
        /// Column name
        column: String,
        /// Why it is rejected
        reason: &'static str,
    },

    /// A value of a single record has no defined encoding
    #[error("Invalid value for {column}: {reason}")]
    InvalidValue {
        /// Column name
        column: String,
        /// Rule the value breaks
        reason: &'static str,
    },

    /// Cells of a raw column are null or out of domain
    #[error("Invalid values in {column}: {reason} (rows {rows:?})")]
    InvalidValues {
        /// Column name
        column: String,
        /// Rule the values break
        reason: &'static str,
        /// 1-based rows holding the offending values
        rows: Vec<usize>,
    },

    /// Row index outside the batch
    #[error("Row {index} out of bounds for batch of {len} rows")]
    RowOutOfBounds {
        /// Requested index
        index: usize,
        /// Batch height
        len: usize,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
