//! Linear reference backend.
//!
//! A logistic model stored as JSON. Each engineered feature has one term:
//!
//! - numeric terms contribute `weight * x`
//! - categorical terms contribute the weight of the observed level
//!
//! and `p = sigmoid(intercept + sum of terms)`. Missing values contribute the
//! term's expectation over the background data.
//!
//! Because the model is additive in log-odds, attributions are exact:
//! numeric `weight * (x - mean)`, categorical `w[level] - sum(f * w)`, missing
//! values 0, and `baseline + sum(contributions) = logit(p)` for every row.
//!
//! ```json
//! {
//!   "name": "churn-linear",
//!   "pipeline_version": "v2",
//!   "requires_identifier_feature": false,
//!   "intercept": -1.9,
//!   "attribution_output": "per_class",
//!   "terms": [
//!     { "feature": "CreditScore", "numeric": { "weight": -0.0007, "mean": 650.5 } },
//!     { "feature": "Geography", "categorical": {
//!         "weights": { "France": 0.0, "Germany": 0.75, "Spain": 0.03 },
//!         "frequencies": { "France": 0.50, "Germany": 0.25, "Spain": 0.25 } } }
//!   ]
//! }
//! ```

use crate::capability::{AttributionOutput, Attributor, BaselineOutput, Classifier};
use crate::context::{ModelConfig, ModelSnapshot};
use crate::error::{ModelError, Result};
use ndarray::Array2;
use retain_features::{EngineeredBatch, FeatureKind, FeatureRow, FeatureValue, PipelineVersion};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Shape in which the attributor reports its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionShape {
    /// A single positive-class matrix
    #[default]
    PositiveClass,
    /// One matrix per class, negative class first
    PerClass,
}

/// Contribution rule of one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermEffect {
    /// Linear in the value
    Numeric {
        /// Log-odds per unit
        weight: f64,
        /// Background mean of the feature
        mean: f64,
    },
    /// One weight per level
    Categorical {
        /// Log-odds per level; absent levels weigh 0
        weights: BTreeMap<String, f64>,
        /// Background frequency per level
        frequencies: BTreeMap<String, f64>,
    },
}

/// One term of the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTerm {
    /// Engineered feature name
    pub feature: String,
    /// Contribution rule
    #[serde(flatten)]
    pub effect: TermEffect,
}

/// On-disk linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearArtifact {
    /// Model name
    pub name: String,
    /// Pipeline version the model was fit with
    pub pipeline_version: PipelineVersion,
    /// Whether the identifier is a feature
    #[serde(default)]
    pub requires_identifier_feature: bool,
    /// Log-odds intercept
    pub intercept: f64,
    /// Attribution output shape
    #[serde(default)]
    pub attribution_output: AttributionShape,
    /// Terms in feature-schema order
    pub terms: Vec<LinearTerm>,
}

impl LinearArtifact {
    /// Configuration carried by the artifact.
    pub fn config(&self) -> ModelConfig {
        ModelConfig {
            name: self.name.clone(),
            pipeline_version: self.pipeline_version,
            requires_identifier_feature: self.requires_identifier_feature,
        }
    }
}

#[derive(Debug, Clone)]
enum CompiledTerm {
    Numeric { weight: f64, mean: f64 },
    Categorical { weights: BTreeMap<String, f64>, expectation: f64 },
}

impl CompiledTerm {
    fn expectation(&self) -> f64 {
        match self {
            Self::Numeric { weight, mean } => weight * mean,
            Self::Categorical { expectation, .. } => *expectation,
        }
    }

    /// Contribution relative to the expectation.
    fn contribution(&self, value: &FeatureValue) -> f64 {
        match self {
            Self::Numeric { weight, mean } => value.as_f64().map_or(0.0, |x| weight * (x - mean)),
            Self::Categorical {
                weights,
                expectation,
            } => value.as_category().map_or(0.0, |level| {
                weights.get(level).copied().unwrap_or(0.0) - expectation
            }),
        }
    }
}

/// Validated linear model, usable as both capabilities.
#[derive(Debug, Clone)]
pub struct LinearModel {
    config: ModelConfig,
    shape: AttributionShape,
    baseline: f64,
    terms: Vec<CompiledTerm>,
}

impl LinearModel {
    /// Validate an artifact against the feature schema it declares.
    ///
    /// Terms must cover the schema's features in order, with categorical terms
    /// exactly on categorical features and levels drawn from the schema.
    pub fn from_artifact(artifact: LinearArtifact) -> Result<Self> {
        let config = artifact.config();
        let schema = config.schema();

        if !artifact.intercept.is_finite() {
            return Err(ModelError::Artifact("intercept is not finite".to_string()));
        }
        if artifact.terms.len() != schema.len() {
            return Err(ModelError::Artifact(format!(
                "expected {} terms for pipeline {}, found {}",
                schema.len(),
                config.pipeline_version,
                artifact.terms.len()
            )));
        }

        let mut terms = Vec::with_capacity(schema.len());
        for (position, (spec, term)) in schema.features().iter().zip(artifact.terms).enumerate() {
            if term.feature != spec.name {
                return Err(ModelError::Artifact(format!(
                    "term {position} is {}, expected {}",
                    term.feature, spec.name
                )));
            }
            terms.push(compile_term(spec.name, spec.kind, term.effect)?);
        }

        let baseline = artifact.intercept + terms.iter().map(CompiledTerm::expectation).sum::<f64>();

        Ok(Self {
            config,
            shape: artifact.attribution_output,
            baseline,
            terms,
        })
    }

    /// Parse and validate a JSON artifact.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_artifact(serde_json::from_str(json)?)
    }

    /// Read and validate a JSON artifact from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Model configuration.
    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Snapshot using this model for both capabilities.
    pub fn into_snapshot(self) -> ModelSnapshot {
        let config = self.config.clone();
        let model = Arc::new(self);
        ModelSnapshot::new(config, model.clone(), model)
    }

    /// Log-odds of one row.
    fn logit(&self, row: &FeatureRow) -> f64 {
        self.baseline + self.contributions(row).sum::<f64>()
    }

    fn contributions<'a>(&'a self, row: &'a FeatureRow) -> impl Iterator<Item = f64> + 'a {
        self.terms
            .iter()
            .zip(row.values())
            .map(|(term, value)| term.contribution(value))
    }

    /// Rows of a batch laid out for this model. Failures are reported
    /// through `fail`, so they carry the operation that was running.
    fn checked_rows(
        &self,
        batch: &EngineeredBatch,
        fail: fn(String) -> ModelError,
    ) -> Result<Vec<FeatureRow>> {
        if batch.schema() != &self.config.schema() {
            return Err(fail(format!(
                "batch layout does not match model {}",
                self.config.name
            )));
        }
        batch.rows().map_err(|e| fail(e.to_string()))
    }
}

/// Load a linear artifact straight into a snapshot.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<ModelSnapshot> {
    Ok(LinearModel::from_path(path)?.into_snapshot())
}

fn compile_term(name: &str, kind: FeatureKind, effect: TermEffect) -> Result<CompiledTerm> {
    match (kind, effect) {
        (FeatureKind::Categorical(levels), TermEffect::Categorical { weights, frequencies }) => {
            let unknown = weights
                .keys()
                .chain(frequencies.keys())
                .find(|level| !levels.iter().any(|l| *l == level.as_str()));
            if let Some(level) = unknown {
                return Err(ModelError::Artifact(format!(
                    "{name}: unknown level {level}"
                )));
            }
            if weights.values().any(|w| !w.is_finite())
                || frequencies.values().any(|f| !f.is_finite() || *f < 0.0)
            {
                return Err(ModelError::Artifact(format!(
                    "{name}: weights must be finite and frequencies non-negative"
                )));
            }

            let expectation = frequencies
                .iter()
                .map(|(level, f)| f * weights.get(level).copied().unwrap_or(0.0))
                .sum();
            Ok(CompiledTerm::Categorical {
                weights,
                expectation,
            })
        }
        (FeatureKind::Categorical(_), TermEffect::Numeric { .. }) => Err(ModelError::Artifact(
            format!("{name} is categorical but has a numeric term"),
        )),
        (_, TermEffect::Categorical { .. }) => Err(ModelError::Artifact(format!(
            "{name} is numeric but has a categorical term"
        ))),
        (_, TermEffect::Numeric { weight, mean }) => {
            if !weight.is_finite() || !mean.is_finite() {
                return Err(ModelError::Artifact(format!(
                    "{name}: weight and mean must be finite"
                )));
            }
            Ok(CompiledTerm::Numeric { weight, mean })
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for LinearModel {
    fn predict_probability(&self, batch: &EngineeredBatch) -> Result<Vec<f64>> {
        Ok(self
            .checked_rows(batch, ModelError::Scoring)?
            .iter()
            .map(|row| sigmoid(self.logit(row)))
            .collect())
    }
}

impl Attributor for LinearModel {
    fn attribute(&self, batch: &EngineeredBatch) -> Result<AttributionOutput> {
        let rows = self.checked_rows(batch, ModelError::Attribution)?;

        let mut matrix = Array2::<f64>::zeros((rows.len(), self.terms.len()));
        for (i, row) in rows.iter().enumerate() {
            for (j, contribution) in self.contributions(row).enumerate() {
                matrix[[i, j]] = contribution;
            }
        }

        Ok(match self.shape {
            AttributionShape::PositiveClass => AttributionOutput::PositiveClass(matrix),
            AttributionShape::PerClass => AttributionOutput::PerClass(vec![-matrix.clone(), matrix]),
        })
    }

    fn baseline(&self) -> BaselineOutput {
        match self.shape {
            AttributionShape::PositiveClass => BaselineOutput::Scalar(self.baseline),
            AttributionShape::PerClass => BaselineOutput::PerClass(vec![-self.baseline, self.baseline]),
        }
    }
}
