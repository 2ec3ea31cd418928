//! Timestamped report envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Required field not set.
    #[error("Missing report field: {0}")]
    MissingField(&'static str),
}

/// Kind of result a report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Single explained prediction
    Prediction,
    /// Scored batch
    BatchPrediction,
    /// Retention valuation
    Retention,
}

/// A result archived with the model and time that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Kind of result.
    pub kind: ReportKind,

    /// Model that produced the result.
    pub model: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report stamped with the current time.
    pub fn new(kind: ReportKind, model: String, contents: serde_json::Value) -> Self {
        Self {
            kind,
            model,
            timestamp: Utc::now(),
            contents,
        }
    }

    /// Wrap any serializable result.
    pub fn from_result<T: Serialize>(
        kind: ReportKind,
        model: &str,
        result: &T,
    ) -> Result<Self, ReportError> {
        ReportBuilder::new()
            .kind(kind)
            .model(model.to_string())
            .contents(serde_json::to_value(result)?)
            .build()
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write report as JSON to a file.
    pub fn write_to(&self, path: &std::path::Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    kind: Option<ReportKind>,
    model: Option<String>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the report kind.
    pub const fn kind(mut self, kind: ReportKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the report contents.
    pub fn contents(mut self, contents: serde_json::Value) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<Report, ReportError> {
        Ok(Report::new(
            self.kind.ok_or(ReportError::MissingField("kind"))?,
            self.model.unwrap_or_default(),
            self.contents.unwrap_or(serde_json::Value::Null),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_creation() {
        let report = Report::new(
            ReportKind::Retention,
            "churn-linear".to_string(),
            serde_json::json!({"evaluated": 3}),
        );

        assert_eq!(report.model, "churn-linear");
        assert_eq!(report.kind, ReportKind::Retention);
    }

    #[test]
    fn test_report_builder() {
        let report = ReportBuilder::new()
            .kind(ReportKind::BatchPrediction)
            .model("churn-linear".to_string())
            .contents(serde_json::json!({"key": "value"}))
            .build()
            .unwrap();

        assert_eq!(report.contents["key"], "value");
        let json = report.to_json().unwrap();
        assert!(json.contains("\"kind\": \"batch_prediction\""));
    }

    #[test]
    fn test_builder_requires_kind() {
        assert!(matches!(
            ReportBuilder::new().build(),
            Err(ReportError::MissingField("kind"))
        ));
    }
}
