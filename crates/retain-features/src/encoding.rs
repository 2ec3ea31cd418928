//! Categorical encodings used by the pipeline.
//!
//! Each encoding is defined once here; the lazy-frame stages build their
//! expressions from these definitions so row-level and column-level code
//! cannot drift apart.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of encoding a categorical value.
///
/// Values outside the known set are `Unknown`; they are never folded into a
/// default level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoded<T> {
    /// Value belongs to the known set
    Known(T),
    /// Value is outside the known set
    Unknown,
}

impl<T> Encoded<T> {
    /// Convert into an `Option`.
    pub fn known(self) -> Option<T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Unknown => None,
        }
    }

    /// Whether the value was recognised.
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

/// Gender as encoded for the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Encoded as 0
    Male,
    /// Encoded as 1
    Female,
}

impl Gender {
    /// Raw label as it appears in customer data.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    /// Numeric model encoding.
    pub const fn code(&self) -> i32 {
        match self {
            Self::Male => 0,
            Self::Female => 1,
        }
    }

    /// Encode a raw label. Matching is exact.
    pub fn encode(raw: &str) -> Encoded<Self> {
        match raw {
            "Male" => Encoded::Known(Self::Male),
            "Female" => Encoded::Known(Self::Female),
            _ => Encoded::Unknown,
        }
    }
}

/// Countries the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Geography {
    /// France
    France,
    /// Germany
    Germany,
    /// Spain
    Spain,
}

impl Geography {
    /// Category levels in code order.
    pub const LEVELS: &'static [&'static str] = &["France", "Germany", "Spain"];

    /// Raw label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::France => "France",
            Self::Germany => "Germany",
            Self::Spain => "Spain",
        }
    }

    /// Encode a raw label. Matching is exact.
    pub fn encode(raw: &str) -> Encoded<Self> {
        match raw {
            "France" => Encoded::Known(Self::France),
            "Germany" => Encoded::Known(Self::Germany),
            "Spain" => Encoded::Known(Self::Spain),
            _ => Encoded::Unknown,
        }
    }
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Age band derived from the customer's age.
///
/// Bins are `[0, 25]`, `(25, 35]`, `(35, 45]`, `(45, 60]`, `(60, ∞)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBucket {
    /// 0 to 25
    VeryYoung,
    /// 26 to 35
    Young,
    /// 36 to 45
    Mid,
    /// 46 to 60
    Mature,
    /// over 60
    Senior,
}

impl AgeBucket {
    /// Lowest age covered by the first bin (inclusive).
    pub const LOWER_EDGE: i64 = 0;

    /// Category levels in code order.
    pub const LEVELS: &'static [&'static str] = &["very_young", "young", "mid", "mature", "senior"];

    /// All buckets in ascending order.
    pub const fn all() -> [Self; 5] {
        [
            Self::VeryYoung,
            Self::Young,
            Self::Mid,
            Self::Mature,
            Self::Senior,
        ]
    }

    /// Inclusive upper edge; `None` for the open-ended last bin.
    pub const fn upper_edge(&self) -> Option<i64> {
        match self {
            Self::VeryYoung => Some(25),
            Self::Young => Some(35),
            Self::Mid => Some(45),
            Self::Mature => Some(60),
            Self::Senior => None,
        }
    }

    /// Category label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::VeryYoung => "very_young",
            Self::Young => "young",
            Self::Mid => "mid",
            Self::Mature => "mature",
            Self::Senior => "senior",
        }
    }

    /// Bucket an age. Negative ages fall outside every bin.
    pub fn from_age(age: i64) -> Encoded<Self> {
        if age < Self::LOWER_EDGE {
            return Encoded::Unknown;
        }
        Self::all()
            .into_iter()
            .find(|b| b.upper_edge().is_none_or(|edge| age <= edge))
            .map_or(Encoded::Unknown, Encoded::Known)
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// `ln(1 + tenure)`.
pub fn tenure_log(tenure: i64) -> f64 {
    (tenure as f64).ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, AgeBucket::VeryYoung)]
    #[case(25, AgeBucket::VeryYoung)]
    #[case(26, AgeBucket::Young)]
    #[case(35, AgeBucket::Young)]
    #[case(36, AgeBucket::Mid)]
    #[case(45, AgeBucket::Mid)]
    #[case(46, AgeBucket::Mature)]
    #[case(60, AgeBucket::Mature)]
    #[case(61, AgeBucket::Senior)]
    #[case(120, AgeBucket::Senior)]
    fn test_age_bucket_edges(#[case] age: i64, #[case] expected: AgeBucket) {
        assert_eq!(AgeBucket::from_age(age), Encoded::Known(expected));
    }

    #[test]
    fn test_negative_age_is_unknown() {
        assert_eq!(AgeBucket::from_age(-1), Encoded::Unknown);
    }

    #[test]
    fn test_levels_follow_bucket_order() {
        let labels: Vec<&str> = AgeBucket::all().iter().map(|b| b.label()).collect();
        assert_eq!(labels, AgeBucket::LEVELS);
    }

    #[test]
    fn test_gender_encoding() {
        assert_eq!(Gender::encode("Male").known().map(|g| g.code()), Some(0));
        assert_eq!(Gender::encode("Female").known().map(|g| g.code()), Some(1));
        assert_eq!(Gender::encode("female"), Encoded::Unknown);
        assert_eq!(Gender::encode("Other"), Encoded::Unknown);
        assert!(!Gender::encode("").is_known());
    }

    #[test]
    fn test_geography_encoding() {
        assert_eq!(Geography::encode("Germany"), Encoded::Known(Geography::Germany));
        assert_eq!(Geography::encode("Italy"), Encoded::Unknown);
        assert_eq!(Geography::LEVELS[1], Geography::Germany.label());
    }

    #[test]
    fn test_tenure_log() {
        assert_eq!(tenure_log(0), 0.0);
        assert_relative_eq!(tenure_log(1), std::f64::consts::LN_2);
        let values: Vec<f64> = (0..=10).map(tenure_log).collect();
        assert!(values.windows(2).all(|w| w[1] > w[0]));
    }
}
