//! Prediction reports.
//!
//! [`PredictionReport`] is the detailed view of one customer;
//! [`BatchPredictionReport`] the operator view of a file of customers,
//! with the probability-threshold and search filter.

use retain_data::{CustomerRef, RowError};
use retain_model::{Attribution, Explanation, RiskLevel};
use serde::{Deserialize, Serialize};
use std::fmt;

fn format_reason(reason: &Attribution) -> String {
    format!("{} ({:+.3})", reason.feature, reason.impact)
}

/// Explained prediction for one customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    /// Customer reference
    pub customer: CustomerRef,
    /// Model that produced the score
    pub model: String,
    /// Churn probability
    pub probability: f64,
    /// Risk band
    pub risk_level: RiskLevel,
    /// Headline reason for the risk band
    pub primary_reason: Option<Attribution>,
    /// Top contributions and baseline
    pub explanation: Explanation,
}

impl PredictionReport {
    /// Assemble a report; the risk band and headline reason follow from the probability.
    pub fn new(
        customer: CustomerRef,
        model: impl Into<String>,
        probability: f64,
        explanation: Explanation,
    ) -> Self {
        let risk_level = RiskLevel::from_probability(probability);
        Self {
            primary_reason: explanation.primary_reason(risk_level).cloned(),
            customer,
            model: model.into(),
            probability,
            risk_level,
            explanation,
        }
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nChurn Prediction: {}\n", self.customer));
        output.push_str(&format!("Model: {}\n", self.model));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{:<24} {:>34.1}%\n",
            "Churn probability",
            self.probability * 100.0
        ));
        output.push_str(&format!("{:<24} {:>35}\n", "Risk level", self.risk_level.name()));
        if let Some(reason) = &self.primary_reason {
            let label = match self.risk_level {
                RiskLevel::High => "Top reason for churn",
                RiskLevel::Low => "Main protective factor",
            };
            output.push_str(&format!("{:<24} {:>35}\n", label, reason.feature));
        }
        output.push_str(&"-".repeat(60));
        output.push('\n');

        output.push_str(&format!(
            "{:<28} {:>14} {:>16}\n",
            "Feature", "Value", "Impact"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for attribution in &self.explanation.attributions {
            output.push_str(&format!(
                "{:<28} {:>14} {:>+16.4}\n",
                attribution.feature, attribution.raw_value, attribution.impact
            ));
        }
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{:<28} {:>14} {:>+16.4}\n",
            "Baseline", "", self.explanation.baseline
        ));
        output.push_str(&"=".repeat(60));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Churn Prediction: {}\n\n", self.customer));
        output.push_str(&format!(
            "**Probability:** {:.1}% ({} risk)\n\n",
            self.probability * 100.0,
            self.risk_level
        ));
        if let Some(reason) = &self.primary_reason {
            output.push_str(&format!("**Primary reason:** {}\n\n", format_reason(reason)));
        }

        output.push_str("| Feature | Value | Impact |\n");
        output.push_str("|---------|-------|--------|\n");
        for attribution in &self.explanation.attributions {
            output.push_str(&format!(
                "| {} | {} | {:+.4} |\n",
                attribution.feature, attribution.raw_value, attribution.impact
            ));
        }

        output
    }
}

impl fmt::Display for PredictionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.1}% ({} risk)",
            self.customer,
            self.probability * 100.0,
            self.risk_level
        )?;
        if let Some(reason) = &self.primary_reason {
            write!(f, ", {}", format_reason(reason))?;
        }
        Ok(())
    }
}

/// One scored customer of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPrediction {
    /// Customer reference
    pub customer: CustomerRef,
    /// Churn probability
    pub probability: f64,
    /// Risk band
    pub risk_level: RiskLevel,
    /// Top reasons by absolute impact
    pub reasons: Vec<Attribution>,
}

impl BatchPrediction {
    /// Assemble a batch row; the risk band follows from the probability.
    pub fn new(customer: CustomerRef, probability: f64, reasons: Vec<Attribution>) -> Self {
        Self {
            customer,
            probability,
            risk_level: RiskLevel::from_probability(probability),
            reasons,
        }
    }
}

/// Scored batch, with the rows that could not be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPredictionReport {
    /// Model that produced the scores
    pub model: String,
    /// Scored customers, in input order
    pub predictions: Vec<BatchPrediction>,
    /// Rows excluded from scoring
    pub errors: Vec<RowError>,
}

impl BatchPredictionReport {
    /// Create a report.
    pub fn new(
        model: impl Into<String>,
        predictions: Vec<BatchPrediction>,
        errors: Vec<RowError>,
    ) -> Self {
        Self {
            model: model.into(),
            predictions,
            errors,
        }
    }

    /// Customers with `probability >= threshold` whose id or surname contains
    /// `search` (case-insensitive), highest probability first.
    pub fn filter(&self, threshold: f64, search: &str) -> Vec<&BatchPrediction> {
        let mut selected: Vec<&BatchPrediction> = self
            .predictions
            .iter()
            .filter(|p| p.probability >= threshold && p.customer.matches(search))
            .collect();
        selected.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        selected
    }

    /// Number of high-risk customers.
    pub fn high_risk_count(&self) -> usize {
        self.predictions
            .iter()
            .filter(|p| p.risk_level == RiskLevel::High)
            .count()
    }

    /// Mean probability, `None` for an empty batch.
    pub fn mean_probability(&self) -> Option<f64> {
        if self.predictions.is_empty() {
            return None;
        }
        let total: f64 = self.predictions.iter().map(|p| p.probability).sum();
        Some(total / self.predictions.len() as f64)
    }

    /// Format rows as ASCII table for terminal display.
    pub fn to_ascii_table(rows: &[&BatchPrediction]) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{:<28} {:>12} {:>6}  {}\n",
            "Customer", "Probability", "Risk", "Top reasons"
        ));
        output.push_str(&"-".repeat(100));
        output.push('\n');
        for row in rows {
            let reasons: Vec<String> = row.reasons.iter().map(format_reason).collect();
            output.push_str(&format!(
                "{:<28} {:>11.1}% {:>6}  {}\n",
                row.customer.to_string(),
                row.probability * 100.0,
                row.risk_level.name(),
                reasons.join(", ")
            ));
        }

        output
    }

    /// Format rows as Markdown for documentation.
    pub fn to_markdown(rows: &[&BatchPrediction]) -> String {
        let mut output = String::new();

        output.push_str("| Customer | Probability | Risk | Top reasons |\n");
        output.push_str("|----------|-------------|------|-------------|\n");
        for row in rows {
            let reasons: Vec<String> = row.reasons.iter().map(format_reason).collect();
            output.push_str(&format!(
                "| {} | {:.1}% | {} | {} |\n",
                row.customer,
                row.probability * 100.0,
                row.risk_level,
                reasons.join(", ")
            ));
        }

        output
    }
}
