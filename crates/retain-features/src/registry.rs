//! Feature Registry
//!
//! Central catalogue of every engineered column, in the order the model
//! consumes them. [`FeatureSchema`](crate::FeatureSchema) is derived from it.

use crate::encoding::{AgeBucket, Geography};
use crate::schema::{FeatureKind, names};
use retain_data::columns;
use std::collections::HashMap;

/// Pipeline stage that produces a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureStage {
    /// Customer identifier, only when the model was fit with it
    Identifier,
    /// Raw column passed through (possibly recast)
    Passthrough,
    /// Derived by the V1 stage
    V1,
    /// Derived by the V2 stage
    V2,
}

/// Feature metadata
#[derive(Debug, Clone)]
pub struct FeatureInfo {
    /// Column name (unique identifier)
    pub name: &'static str,
    /// Producing stage
    pub stage: FeatureStage,
    /// Storage kind
    pub kind: FeatureKind,
    /// Brief description
    pub description: &'static str,
    /// Raw columns the feature is computed from
    pub source_columns: &'static [&'static str],
}

/// All engineered features in model order.
pub fn engineered_features() -> Vec<FeatureInfo> {
    vec![
        FeatureInfo {
            name: columns::CUSTOMER_ID,
            stage: FeatureStage::Identifier,
            kind: FeatureKind::Integer,
            description: "Customer identifier (placeholder 0 when unknown)",
            source_columns: &[columns::CUSTOMER_ID],
        },
        FeatureInfo {
            name: columns::CREDIT_SCORE,
            stage: FeatureStage::Passthrough,
            kind: FeatureKind::Integer,
            description: "Credit score",
            source_columns: &[columns::CREDIT_SCORE],
        },
        FeatureInfo {
            name: columns::GEOGRAPHY,
            stage: FeatureStage::Passthrough,
            kind: FeatureKind::Categorical(Geography::LEVELS),
            description: "Country of residence",
            source_columns: &[columns::GEOGRAPHY],
        },
        FeatureInfo {
            name: columns::GENDER,
            stage: FeatureStage::V1,
            kind: FeatureKind::Integer,
            description: "Gender encoded Male=0, Female=1, missing otherwise",
            source_columns: &[columns::GENDER],
        },
        FeatureInfo {
            name: columns::AGE,
            stage: FeatureStage::Passthrough,
            kind: FeatureKind::Integer,
            description: "Age in years",
            source_columns: &[columns::AGE],
        },
        FeatureInfo {
            name: columns::BALANCE,
            stage: FeatureStage::Passthrough,
            kind: FeatureKind::Float,
            description: "Account balance",
            source_columns: &[columns::BALANCE],
        },
        FeatureInfo {
            name: columns::NUM_PRODUCTS,
            stage: FeatureStage::Passthrough,
            kind: FeatureKind::Integer,
            description: "Number of products held",
            source_columns: &[columns::NUM_PRODUCTS],
        },
        FeatureInfo {
            name: columns::HAS_CREDIT_CARD,
            stage: FeatureStage::Passthrough,
            kind: FeatureKind::Flag,
            description: "Holds a credit card",
            source_columns: &[columns::HAS_CREDIT_CARD],
        },
        FeatureInfo {
            name: columns::IS_ACTIVE_MEMBER,
            stage: FeatureStage::Passthrough,
            kind: FeatureKind::Flag,
            description: "Active member",
            source_columns: &[columns::IS_ACTIVE_MEMBER],
        },
        FeatureInfo {
            name: columns::ESTIMATED_SALARY,
            stage: FeatureStage::Passthrough,
            kind: FeatureKind::Float,
            description: "Estimated annual salary",
            source_columns: &[columns::ESTIMATED_SALARY],
        },
        FeatureInfo {
            name: names::AGE_BUCKET,
            stage: FeatureStage::V1,
            kind: FeatureKind::Categorical(AgeBucket::LEVELS),
            description: "Age band with edges 0/25/35/45/60",
            source_columns: &[columns::AGE],
        },
        FeatureInfo {
            name: names::IS_TWO_PRODUCTS,
            stage: FeatureStage::V1,
            kind: FeatureKind::Flag,
            description: "Holds exactly two products",
            source_columns: &[columns::NUM_PRODUCTS],
        },
        FeatureInfo {
            name: names::GERMANY_FEMALE,
            stage: FeatureStage::V1,
            kind: FeatureKind::Flag,
            description: "Resident in Germany and female",
            source_columns: &[columns::GEOGRAPHY, columns::GENDER],
        },
        FeatureInfo {
            name: names::GERMANY_INACTIVE,
            stage: FeatureStage::V1,
            kind: FeatureKind::Flag,
            description: "Resident in Germany and not an active member",
            source_columns: &[columns::GEOGRAPHY, columns::IS_ACTIVE_MEMBER],
        },
        FeatureInfo {
            name: names::HAS_ZERO_BALANCE,
            stage: FeatureStage::V1,
            kind: FeatureKind::Flag,
            description: "Balance is exactly zero",
            source_columns: &[columns::BALANCE],
        },
        FeatureInfo {
            name: names::TENURE_LOG,
            stage: FeatureStage::V1,
            kind: FeatureKind::Float,
            description: "Natural log of one plus tenure in years",
            source_columns: &[columns::TENURE],
        },
        FeatureInfo {
            name: names::IS_MATURE_INACTIVE_TRANSIT,
            stage: FeatureStage::V2,
            kind: FeatureKind::Flag,
            description: "Zero balance, inactive and older than 40",
            source_columns: &[columns::BALANCE, columns::IS_ACTIVE_MEMBER, columns::AGE],
        },
    ]
}

/// Get features by stage
pub fn features_by_stage(stage: FeatureStage) -> Vec<FeatureInfo> {
    engineered_features()
        .into_iter()
        .filter(|f| f.stage == stage)
        .collect()
}

/// Get feature info by name
pub fn get_feature_info(name: &str) -> Option<FeatureInfo> {
    engineered_features().into_iter().find(|f| f.name == name)
}

/// Count features by stage
pub fn count_by_stage() -> HashMap<FeatureStage, usize> {
    let mut counts = HashMap::new();
    for feature in engineered_features() {
        *counts.entry(feature.stage).or_insert(0) += 1;
    }
    counts
}
