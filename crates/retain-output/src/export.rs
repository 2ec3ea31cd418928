//! Export of prediction and retention reports.
//!
//! Every report can be written as CSV (one flat record per customer or
//! feature) or as JSON (the report structure as is).

use crate::prediction::{BatchPredictionReport, PredictionReport};
use crate::retention::RetentionReport;
use retain_data::RowError;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(Self::Csv),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(format!(
                "unsupported extension {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn write_csv<R: Serialize>(records: impl IntoIterator<Item = R>) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

fn write_json<T: Serialize + ?Sized>(value: &T, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string(value)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(value)?),
        ExportFormat::Csv => Err(ExportError::InvalidFormat(
            "CSV is not a JSON format".to_string(),
        )),
    }
}

/// Flattened attribution for CSV export.
#[derive(Debug, Serialize)]
struct AttributionFlat<'a> {
    customer: String,
    probability: f64,
    risk_level: &'static str,
    rank: usize,
    feature: &'a str,
    raw_value: &'a str,
    impact: f64,
}

/// Flattened batch prediction for CSV export.
#[derive(Debug, Serialize)]
struct BatchPredictionFlat<'a> {
    row: usize,
    customer_id: Option<i64>,
    surname: Option<&'a str>,
    probability: f64,
    risk_level: &'static str,
    reason_1: Option<&'a str>,
    impact_1: Option<f64>,
    reason_2: Option<&'a str>,
    impact_2: Option<f64>,
    reason_3: Option<&'a str>,
    impact_3: Option<f64>,
}

/// Flattened retention candidate for CSV export.
#[derive(Debug, Serialize)]
struct RetentionCandidateFlat<'a> {
    rank: usize,
    row: usize,
    customer_id: Option<i64>,
    surname: Option<&'a str>,
    probability: f64,
    lifetime_value: f64,
    expected_net_return: f64,
}

impl Exporter for PredictionReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv(self.explanation.attributions.iter().enumerate().map(
                |(i, a)| AttributionFlat {
                    customer: self.customer.to_string(),
                    probability: self.probability,
                    risk_level: self.risk_level.name(),
                    rank: i + 1,
                    feature: &a.feature,
                    raw_value: &a.raw_value,
                    impact: a.impact,
                },
            )),
            _ => write_json(self, format),
        }
    }
}

impl Exporter for BatchPredictionReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv(self.predictions.iter().map(|p| {
                let reason = |i: usize| p.reasons.get(i).map(|a| a.feature.as_str());
                let impact = |i: usize| p.reasons.get(i).map(|a| a.impact);
                BatchPredictionFlat {
                    row: p.customer.row,
                    customer_id: p.customer.customer_id,
                    surname: p.customer.surname.as_deref(),
                    probability: p.probability,
                    risk_level: p.risk_level.name(),
                    reason_1: reason(0),
                    impact_1: impact(0),
                    reason_2: reason(1),
                    impact_2: impact(1),
                    reason_3: reason(2),
                    impact_3: impact(2),
                }
            })),
            _ => write_json(self, format),
        }
    }
}

impl Exporter for RetentionReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                write_csv(self.candidates.iter().enumerate().map(|(i, c)| {
                    RetentionCandidateFlat {
                        rank: i + 1,
                        row: c.customer.row,
                        customer_id: c.customer.customer_id,
                        surname: c.customer.surname.as_deref(),
                        probability: c.probability,
                        lifetime_value: c.lifetime_value,
                        expected_net_return: c.expected_net_return,
                    }
                }))
            }
            _ => write_json(self, format),
        }
    }
}

impl Exporter for Vec<RowError> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv(self.iter()),
            _ => write_json(self, format),
        }
    }
}
