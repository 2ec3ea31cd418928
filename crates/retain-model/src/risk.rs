//! Risk levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Probability above which a customer is high risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.5;

/// Coarse churn risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// `probability > 0.5`
    High,
    /// `probability <= 0.5`
    Low,
}

impl RiskLevel {
    /// Band for a probability.
    pub fn from_probability(probability: f64) -> Self {
        if probability > HIGH_RISK_THRESHOLD {
            Self::High
        } else {
            Self::Low
        }
    }

    /// Display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, RiskLevel::Low)]
    #[case(0.5, RiskLevel::Low)]
    #[case(0.500_001, RiskLevel::High)]
    #[case(0.999, RiskLevel::High)]
    fn test_risk_level(#[case] probability: f64, #[case] expected: RiskLevel) {
        assert_eq!(RiskLevel::from_probability(probability), expected);
    }
}
