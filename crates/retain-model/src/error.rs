//! Error types for scoring and attribution.

use retain_features::FeatureError;
use thiserror::Error;

/// Errors raised by model capabilities and the engines built on them.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No model is loaded
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    /// Classifier rejected the batch or produced invalid output
    #[error("Scoring failed: {0}")]
    Scoring(String),

    /// Attributor rejected the batch or produced output of the wrong shape
    #[error("Attribution failed: {0}")]
    Attribution(String),

    /// Model artifact is malformed or does not match the feature schema
    #[error("Invalid model artifact: {0}")]
    Artifact(String),

    /// Feature pipeline error
    #[error("Feature error: {0}")]
    Features(#[from] FeatureError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
