//! Attribution Engine
//!
//! Explains predictions with signed per-feature contributions. Backend output
//! is reduced to the churn class right after the capability call and checked
//! against the batch shape, then every row goes through the same ranking.
//!
//! Single-customer explanations keep the top 10 features by absolute impact,
//! batch explanations the top 3, so the batch reasons for a row are always a
//! prefix of its detailed explanation.

use crate::capability::Attributor;
use crate::error::{ModelError, Result};
use crate::ranking::{Attribution, RankingPolicy, rank};
use crate::risk::RiskLevel;
use ndarray::{Array2, ArrayView1};
use retain_features::{EngineeredBatch, FeatureRow};
use serde::Serialize;
use std::sync::Arc;

/// Features kept in a single-customer explanation.
pub const DETAIL_TOP_K: usize = 10;

/// Features kept per row in a batch explanation.
pub const BATCH_TOP_K: usize = 3;

/// Ranked reasons for one row of a batch.
pub type ExplanationSet = Vec<Attribution>;

/// Detailed explanation of a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    /// Top contributions by absolute impact
    pub attributions: Vec<Attribution>,
    /// Expected model output the contributions are measured from
    pub baseline: f64,
    #[serde(skip)]
    strongest_increase: Option<Attribution>,
    #[serde(skip)]
    strongest_decrease: Option<Attribution>,
}

impl Explanation {
    fn from_row(all: Vec<Attribution>, baseline: f64) -> Self {
        let strongest_increase = rank(all.clone(), RankingPolicy::Signed, 1).pop();
        let strongest_decrease = all
            .iter()
            .min_by(|a, b| a.impact.total_cmp(&b.impact))
            .cloned();

        Self {
            attributions: rank(all, RankingPolicy::Absolute, DETAIL_TOP_K),
            baseline,
            strongest_increase,
            strongest_decrease,
        }
    }

    /// Headline reason for an operator.
    ///
    /// High risk: the feature pushing hardest towards churn.
    /// Low risk: the feature pushing hardest away from it.
    pub fn primary_reason(&self, risk: RiskLevel) -> Option<&Attribution> {
        match risk {
            RiskLevel::High => self.strongest_increase.as_ref(),
            RiskLevel::Low => self.strongest_decrease.as_ref(),
        }
    }

    /// Sum of the retained contributions.
    pub fn total_impact(&self) -> f64 {
        self.attributions.iter().map(|a| a.impact).sum()
    }
}

/// Explains predictions through an [`Attributor`].
#[derive(Debug, Clone)]
pub struct AttributionEngine {
    attributor: Arc<dyn Attributor>,
}

impl AttributionEngine {
    /// Create an engine over an attributor.
    pub fn new(attributor: Arc<dyn Attributor>) -> Self {
        Self { attributor }
    }

    /// Explain a batch holding exactly one row.
    pub fn explain_one(&self, batch: &EngineeredBatch) -> Result<Explanation> {
        if batch.len() != 1 {
            return Err(ModelError::Attribution(format!(
                "expected a single row, got {}",
                batch.len()
            )));
        }

        let contributions = self.contributions(batch)?;
        let baseline = self.attributor.baseline().into_positive_class()?;
        let row = batch.row(0)?;
        let all = row_attributions(batch, contributions.row(0), &row);

        Ok(Explanation::from_row(all, baseline))
    }

    /// Top reasons for every row, in row order.
    pub fn explain_batch(&self, batch: &EngineeredBatch) -> Result<Vec<ExplanationSet>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let contributions = self.contributions(batch)?;
        let rows = batch.rows()?;

        Ok(rows
            .iter()
            .zip(contributions.rows())
            .map(|(row, impacts)| {
                rank(
                    row_attributions(batch, impacts, row),
                    RankingPolicy::Absolute,
                    BATCH_TOP_K,
                )
            })
            .collect())
    }

    /// Positive-class contributions, checked to be `rows x features` and finite.
    fn contributions(&self, batch: &EngineeredBatch) -> Result<Array2<f64>> {
        let matrix = self.attributor.attribute(batch)?.into_positive_class()?;

        let expected = (batch.len(), batch.schema().len());
        if matrix.dim() != expected {
            return Err(ModelError::Attribution(format!(
                "expected {}x{} contributions, got {}x{}",
                expected.0,
                expected.1,
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::Attribution(
                "attributor returned non-finite contributions".to_string(),
            ));
        }

        Ok(matrix)
    }
}

fn row_attributions(
    batch: &EngineeredBatch,
    impacts: ArrayView1<'_, f64>,
    row: &FeatureRow,
) -> Vec<Attribution> {
    batch
        .feature_names()
        .into_iter()
        .zip(impacts.iter())
        .zip(row.values())
        .map(|((name, impact), value)| Attribution::new(name, *impact, value.to_string()))
        .collect()
}
