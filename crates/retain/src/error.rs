//! Service-level errors.

use retain_data::DataError;
use retain_features::FeatureError;
use retain_model::ModelError;
use retain_output::{ExportError, OutputError, ReportError};
use thiserror::Error;

/// Errors surfaced by [`ChurnService`](crate::ChurnService).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input could not be read or parsed
    #[error(transparent)]
    Data(#[from] DataError),

    /// Input does not fit the feature pipeline
    #[error(transparent)]
    Features(#[from] FeatureError),

    /// Model unavailable or failing
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Retention inputs or parameters out of range
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Export failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Report generation failed
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl ServiceError {
    /// Whether the caller can fix the error by changing the input.
    pub const fn is_client_error(&self) -> bool {
        match self {
            Self::Data(_) => true,
            Self::Features(e) | Self::Model(ModelError::Features(e)) => is_schema_error(e),
            Self::Output(OutputError::InvalidConfig(_) | OutputError::InvalidInput(_)) => true,
            _ => false,
        }
    }

    /// Whether the error means no model is loaded.
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Model(ModelError::Unavailable(_)))
    }
}

const fn is_schema_error(error: &FeatureError) -> bool {
    matches!(
        error,
        FeatureError::MissingColumn { .. }
            | FeatureError::InvalidColumn { .. }
            | FeatureError::UnexpectedColumn { .. }
            | FeatureError::InvalidValue { .. }
            | FeatureError::InvalidValues { .. }
    )
}

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;
