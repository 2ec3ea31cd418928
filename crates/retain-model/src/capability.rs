//! Model capabilities.
//!
//! A model backend provides two capabilities over an engineered batch: a
//! [`Classifier`] producing positive-class probabilities and an
//! [`Attributor`] producing signed per-feature contributions. Backends differ
//! in the shape of their attribution output; [`AttributionOutput`] and
//! [`BaselineOutput`] capture both shapes and reduce them to the churn class.

use crate::error::{ModelError, Result};
use ndarray::Array2;
use retain_features::EngineeredBatch;
use std::fmt;

/// Index of the churn class in per-class outputs.
pub const POSITIVE_CLASS: usize = 1;

/// Produces churn probabilities.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Positive-class probability for each row, in row order.
    fn predict_probability(&self, batch: &EngineeredBatch) -> Result<Vec<f64>>;
}

/// Produces per-feature contributions.
pub trait Attributor: Send + Sync + fmt::Debug {
    /// Signed contributions for each row and feature.
    fn attribute(&self, batch: &EngineeredBatch) -> Result<AttributionOutput>;

    /// Expected model output over the background data.
    fn baseline(&self) -> BaselineOutput;
}

/// Raw attribution output of a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributionOutput {
    /// One `rows x features` matrix per class
    PerClass(Vec<Array2<f64>>),
    /// A single `rows x features` matrix for the positive class
    PositiveClass(Array2<f64>),
}

impl AttributionOutput {
    /// Reduce to the positive class.
    ///
    /// Per-class output takes class 1, or class 0 when only one class is present.
    pub fn into_positive_class(self) -> Result<Array2<f64>> {
        match self {
            Self::PositiveClass(matrix) => Ok(matrix),
            Self::PerClass(mut classes) => match classes.len() {
                0 => Err(ModelError::Attribution(
                    "backend returned no classes".to_string(),
                )),
                1 => Ok(classes.swap_remove(0)),
                _ => Ok(classes.swap_remove(POSITIVE_CLASS)),
            },
        }
    }
}

/// Raw baseline of a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BaselineOutput {
    /// Single expected value
    Scalar(f64),
    /// One expected value per class
    PerClass(Vec<f64>),
}

impl BaselineOutput {
    /// Reduce to the positive class, with the same rule as [`AttributionOutput`].
    pub fn into_positive_class(self) -> Result<f64> {
        match self {
            Self::Scalar(value) => Ok(value),
            Self::PerClass(values) => match values.as_slice() {
                [] => Err(ModelError::Attribution(
                    "backend returned no baseline".to_string(),
                )),
                [only] => Ok(*only),
                many => Ok(many[POSITIVE_CLASS]),
            },
        }
    }
}
