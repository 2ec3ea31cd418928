//! Engineered feature schema.
//!
//! The schema fixes the column set, order, dtype and categorical levels of an
//! engineered batch. Classifier and attributor are both order-sensitive, so
//! every batch produced for a given pipeline version and identifier flag has
//! exactly this layout.

use crate::registry::{FeatureStage, engineered_features};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Engineered column names.
pub mod names {
    /// Age band.
    pub const AGE_BUCKET: &str = "age_bucket";
    /// Holds exactly two products.
    pub const IS_TWO_PRODUCTS: &str = "is_two_products";
    /// German and female.
    pub const GERMANY_FEMALE: &str = "germany_female";
    /// German and inactive.
    pub const GERMANY_INACTIVE: &str = "germany_inactive";
    /// Zero balance.
    pub const HAS_ZERO_BALANCE: &str = "has_zero_balance";
    /// `ln(1 + tenure)`.
    pub const TENURE_LOG: &str = "tenure_log";
    /// Zero balance, inactive and older than 40.
    pub const IS_MATURE_INACTIVE_TRANSIT: &str = "is_mature_inactive_transit";
}

/// Version of the transformation pipeline a model was fit with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineVersion {
    /// Base feature set
    V1,
    /// Base feature set plus the mature-inactive interaction
    #[default]
    V2,
}

impl fmt::Display for PipelineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2 => write!(f, "v2"),
        }
    }
}

/// Storage kind of an engineered column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// 64-bit integer (nullable)
    Integer,
    /// 64-bit float
    Float,
    /// 0/1 flag stored as 32-bit integer
    Flag,
    /// Unordered label with a fixed level set
    Categorical(&'static [&'static str]),
}

impl FeatureKind {
    /// Polars dtype of the engineered column.
    ///
    /// Categoricals are enums over their declared levels, so a label's
    /// physical code is its level position whatever the batch holds.
    pub fn dtype(&self) -> DataType {
        match self {
            Self::Integer => DataType::Int64,
            Self::Float => DataType::Float64,
            Self::Flag => DataType::Int32,
            Self::Categorical(levels) => create_enum_dtype(
                StringChunked::from_slice(PlSmallStr::EMPTY, *levels)
                    .rechunk()
                    .downcast_into_array(),
            ),
        }
    }

    /// Code of a categorical level, `None` for unknown labels or non-categorical kinds.
    pub fn level_code(&self, label: &str) -> Option<usize> {
        match self {
            Self::Categorical(levels) => levels.iter().position(|l| *l == label),
            _ => None,
        }
    }
}

/// One engineered column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    /// Column name
    pub name: &'static str,
    /// Storage kind
    pub kind: FeatureKind,
}

/// Ordered engineered column layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    version: PipelineVersion,
    include_identifier: bool,
    features: Vec<FeatureSpec>,
}

impl FeatureSchema {
    /// Layout for a pipeline version, optionally carrying the identifier feature first.
    pub fn new(version: PipelineVersion, include_identifier: bool) -> Self {
        let features = engineered_features()
            .into_iter()
            .filter(|info| match info.stage {
                FeatureStage::Identifier => include_identifier,
                FeatureStage::Passthrough | FeatureStage::V1 => true,
                FeatureStage::V2 => version == PipelineVersion::V2,
            })
            .map(|info| FeatureSpec {
                name: info.name,
                kind: info.kind,
            })
            .collect();

        Self {
            version,
            include_identifier,
            features,
        }
    }

    /// Pipeline version.
    pub const fn version(&self) -> PipelineVersion {
        self.version
    }

    /// Whether the identifier is part of the feature set.
    pub const fn includes_identifier(&self) -> bool {
        self.include_identifier
    }

    /// Columns in order.
    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    /// Column names in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.features.iter().map(|f| f.name).collect()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Position of a column.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f.name == name)
    }

    /// Final projection: exactly the schema columns, in order, with their dtypes.
    pub(crate) fn projection(&self) -> Vec<Expr> {
        self.features
            .iter()
            .map(|f| col(f.name).cast(f.kind.dtype()).alias(f.name))
            .collect()
    }
}
