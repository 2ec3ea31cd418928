//! Scoring Engine
//!
//! Wraps a [`Classifier`] and enforces the probability contract: one finite
//! value in `[0, 1]` per row, capped at [`PROBABILITY_CEILING`].

use crate::capability::Classifier;
use crate::error::{ModelError, Result};
use retain_features::EngineeredBatch;
use std::sync::Arc;

/// Highest probability reported to callers.
pub const PROBABILITY_CEILING: f64 = 0.999;

/// Cap a probability at [`PROBABILITY_CEILING`].
pub fn clamp_probability(probability: f64) -> f64 {
    probability.min(PROBABILITY_CEILING)
}

/// Turns engineered batches into churn probabilities.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    classifier: Arc<dyn Classifier>,
}

impl ScoringEngine {
    /// Create an engine over a classifier.
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Probability for every row, in row order.
    pub fn score_batch(&self, batch: &EngineeredBatch) -> Result<Vec<f64>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let raw = self.classifier.predict_probability(batch)?;
        if raw.len() != batch.len() {
            return Err(ModelError::Scoring(format!(
                "classifier returned {} probabilities for {} rows",
                raw.len(),
                batch.len()
            )));
        }

        raw.into_iter()
            .enumerate()
            .map(|(row, p)| {
                if p.is_finite() && (0.0..=1.0).contains(&p) {
                    Ok(clamp_probability(p))
                } else {
                    Err(ModelError::Scoring(format!(
                        "classifier returned invalid probability {p} for row {row}"
                    )))
                }
            })
            .collect()
    }

    /// Probability for a batch holding exactly one row.
    pub fn score_one(&self, batch: &EngineeredBatch) -> Result<f64> {
        if batch.len() != 1 {
            return Err(ModelError::Scoring(format!(
                "expected a single row, got {}",
                batch.len()
            )));
        }
        self.score_batch(batch)?
            .pop()
            .ok_or_else(|| ModelError::Scoring("classifier returned no probability".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retain_data::RawCustomerRecord;
    use retain_features::FeatureTransformer;

    /// Returns a fixed list of outputs regardless of the batch.
    #[derive(Debug)]
    struct Fixed(Vec<f64>);

    impl Classifier for Fixed {
        fn predict_probability(&self, _batch: &EngineeredBatch) -> Result<Vec<f64>> {
            Ok(self.0.clone())
        }
    }

    fn batch(n: usize) -> EngineeredBatch {
        let record = RawCustomerRecord {
            customer_id: Some(1),
            surname: None,
            credit_score: 700,
            geography: "France".to_string(),
            gender: "Male".to_string(),
            age: 30,
            tenure: 2,
            balance: 0.0,
            num_products: 2,
            has_credit_card: true,
            is_active_member: true,
            estimated_salary: 60_000.0,
        };
        FeatureTransformer::default()
            .transform_records(&vec![record; n])
            .unwrap()
    }

    fn engine(outputs: Vec<f64>) -> ScoringEngine {
        ScoringEngine::new(Arc::new(Fixed(outputs)))
    }

    #[test]
    fn test_ceiling() {
        assert_eq!(engine(vec![1.0]).score_one(&batch(1)).unwrap(), 0.999);
        assert_eq!(engine(vec![0.25]).score_one(&batch(1)).unwrap(), 0.25);
    }

    #[test]
    fn test_score_one_requires_single_row() {
        let err = engine(vec![0.1, 0.2]).score_one(&batch(2)).unwrap_err();
        assert!(matches!(err, ModelError::Scoring(_)));
    }

    #[test]
    fn test_wrong_output_count() {
        let err = engine(vec![0.1]).score_batch(&batch(3)).unwrap_err();
        assert!(matches!(err, ModelError::Scoring(_)));
    }

    #[test]
    fn test_invalid_probabilities() {
        for bad in [f64::NAN, -0.01, 1.5, f64::INFINITY] {
            let err = engine(vec![bad]).score_batch(&batch(1)).unwrap_err();
            assert!(matches!(err, ModelError::Scoring(_)), "{bad} accepted");
        }
    }

    #[test]
    fn test_empty_batch_skips_classifier() {
        let scores = engine(vec![0.5]).score_batch(&batch(0)).unwrap();
        assert!(scores.is_empty());
    }
}
