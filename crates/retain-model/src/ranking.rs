//! Attribution ranking.
//!
//! Every ranked list in the workspace goes through [`rank`], so single and
//! batch explanations of the same row always agree up to truncation.

use serde::{Deserialize, Serialize};

/// Signed contribution of one feature to one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    /// Engineered feature name
    pub feature: String,
    /// Signed contribution (positive pushes towards churn)
    pub impact: f64,
    /// Engineered value of the feature, as displayed
    pub raw_value: String,
}

impl Attribution {
    /// Create an attribution.
    pub fn new(feature: impl Into<String>, impact: f64, raw_value: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            impact,
            raw_value: raw_value.into(),
        }
    }

    /// Whether the feature pushes the prediction towards churn.
    pub fn increases_risk(&self) -> bool {
        self.impact > 0.0
    }
}

/// Ordering applied by [`rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingPolicy {
    /// Descending by signed impact
    Signed,
    /// Descending by absolute impact
    Absolute,
}

/// Sort by `policy` and keep the first `k`. Ties keep their input order.
pub fn rank(mut attributions: Vec<Attribution>, policy: RankingPolicy, k: usize) -> Vec<Attribution> {
    match policy {
        RankingPolicy::Signed => attributions.sort_by(|a, b| b.impact.total_cmp(&a.impact)),
        RankingPolicy::Absolute => {
            attributions.sort_by(|a, b| b.impact.abs().total_cmp(&a.impact.abs()));
        }
    }
    attributions.truncate(k);
    attributions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Attribution> {
        vec![
            Attribution::new("Age", 0.40, "52"),
            Attribution::new("Balance", -0.90, "0.0000"),
            Attribution::new("germany_female", 0.10, "1"),
            Attribution::new("IsActiveMember", -0.40, "1"),
            Attribution::new("tenure_log", 0.0, "1.0986"),
        ]
    }

    fn names(ranked: &[Attribution]) -> Vec<&str> {
        ranked.iter().map(|a| a.feature.as_str()).collect()
    }

    #[test]
    fn test_absolute_ranking() {
        let ranked = rank(sample(), RankingPolicy::Absolute, 3);
        assert_eq!(names(&ranked), vec!["Balance", "Age", "IsActiveMember"]);
    }

    #[test]
    fn test_signed_ranking() {
        let ranked = rank(sample(), RankingPolicy::Signed, 5);
        assert_eq!(
            names(&ranked),
            vec!["Age", "germany_female", "tenure_log", "IsActiveMember", "Balance"]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank(sample(), RankingPolicy::Absolute, 5);
        let age = ranked.iter().position(|a| a.feature == "Age").unwrap();
        let active = ranked.iter().position(|a| a.feature == "IsActiveMember").unwrap();
        assert!(age < active);
    }

    #[test]
    fn test_k_larger_than_input() {
        assert_eq!(rank(sample(), RankingPolicy::Absolute, 50).len(), 5);
        assert!(rank(Vec::new(), RankingPolicy::Signed, 3).is_empty());
    }

    #[test]
    fn test_truncation_is_prefix() {
        let full = rank(sample(), RankingPolicy::Absolute, 10);
        let top = rank(sample(), RankingPolicy::Absolute, 3);
        assert_eq!(top.as_slice(), &full[..3]);
    }
}
