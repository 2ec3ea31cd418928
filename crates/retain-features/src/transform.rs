//! Feature Transformer
//!
//! Turns raw customer columns into the engineered layout the model was fit
//! on. The pipeline is a sequence of named lazy-frame stages:
//!
//! 1. validation of raw columns (presence, dtype class, label rule) and of
//!    their cells (no nulls, values inside the encodable domain)
//! 2. normalisation of raw dtypes
//! 3. [`v1_stage`] (and [`v2_stage`], which runs V1 first)
//! 4. identifier handling
//! 5. projection onto the schema, which drops `CustomerId`, `Tenure`,
//!    `Surname` and the label
//!
//! Every derived column is computed from its own row only.

use crate::batch::EngineeredBatch;
use crate::encoding::{self, AgeBucket, Gender, Geography};
use crate::error::FeatureError;
use crate::frame::records_to_frame;
use crate::schema::{FeatureKind, FeatureSchema, PipelineVersion, names};
use crate::validate::{RAW_LAYOUT, check_layout, check_values};
use polars::prelude::*;
use retain_data::{RawCustomerRecord, columns};
use serde::{Deserialize, Serialize};

/// Value used for the identifier feature when a row has no customer id.
pub const PLACEHOLDER_ID: i64 = 0;

/// Whether the transformer is preparing training data or scoring data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformContext {
    /// Scoring: the label column must be absent
    #[default]
    Inference,
    /// Training: the label column must be present and is dropped
    Training,
}

/// Configuration for the FeatureTransformer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Pipeline version the model was fit with
    pub version: PipelineVersion,
    /// Keep the customer identifier as the first feature
    pub include_identifier: bool,
    /// Training or inference
    pub context: TransformContext,
}

/// Deterministic raw-to-engineered transformation.
#[derive(Debug, Clone)]
pub struct FeatureTransformer {
    config: TransformConfig,
    schema: FeatureSchema,
}

impl Default for FeatureTransformer {
    fn default() -> Self {
        Self::new(TransformConfig::default())
    }
}

impl FeatureTransformer {
    /// Create a transformer for the given configuration.
    pub fn new(config: TransformConfig) -> Self {
        Self {
            schema: FeatureSchema::new(config.version, config.include_identifier),
            config,
        }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Output layout.
    pub const fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Transform a raw frame.
    ///
    /// # Errors
    ///
    /// Fails when a required column is missing or has an incompatible dtype,
    /// when the label rule of the context is violated, or when a cell is null
    /// or outside the encodable domain. Nothing is synthesized for missing
    /// columns or cells.
    pub fn transform(&self, raw: &DataFrame) -> Result<EngineeredBatch, FeatureError> {
        validate_raw(raw, self.config.context)?;

        let mut lf = normalize(raw.clone().lazy());
        lf = match self.config.version {
            PipelineVersion::V1 => v1_stage(lf),
            PipelineVersion::V2 => v2_stage(lf),
        };

        if self.config.include_identifier {
            let identifier = if has_column(raw, columns::CUSTOMER_ID) {
                col(columns::CUSTOMER_ID)
                    .cast(DataType::Int64)
                    .fill_null(lit(PLACEHOLDER_ID))
            } else {
                lit(PLACEHOLDER_ID)
            };
            lf = lf.with_column(identifier.alias(columns::CUSTOMER_ID));
        }

        let frame = lf.select(self.schema.projection()).collect()?;
        tracing::debug!(
            rows = frame.height(),
            version = %self.config.version,
            features = self.schema.len(),
            "transformed batch"
        );
        Ok(EngineeredBatch::new(self.schema.clone(), frame))
    }

    /// Transform typed records.
    pub fn transform_records(
        &self,
        records: &[RawCustomerRecord],
    ) -> Result<EngineeredBatch, FeatureError> {
        self.transform(&records_to_frame(records)?)
    }
}

/// V1 stage: gender encoding, age buckets, interaction flags, `tenure_log`
/// and the integer/categorical casts the model expects.
pub fn v1_stage(lf: LazyFrame) -> LazyFrame {
    let flag_casts = [
        columns::HAS_CREDIT_CARD,
        columns::IS_ACTIVE_MEMBER,
        names::IS_TWO_PRODUCTS,
        names::GERMANY_FEMALE,
        names::GERMANY_INACTIVE,
        names::HAS_ZERO_BALANCE,
    ]
    .into_iter()
    .map(|c| col(c).cast(DataType::Int32));

    let categorical_casts = [
        (columns::GEOGRAPHY, Geography::LEVELS),
        (names::AGE_BUCKET, AgeBucket::LEVELS),
    ]
    .into_iter()
    .map(|(c, levels)| col(c).cast(FeatureKind::Categorical(levels).dtype()));

    lf.with_columns([encode_gender(), age_bucket(), tenure_log()])
        .with_columns([
            col(columns::NUM_PRODUCTS)
                .eq(lit(2i64))
                .alias(names::IS_TWO_PRODUCTS),
            in_germany()
                .and(
                    col(columns::GENDER)
                        .eq(lit(Gender::Female.code()))
                        .fill_null(lit(false)),
                )
                .alias(names::GERMANY_FEMALE),
            in_germany()
                .and(col(columns::IS_ACTIVE_MEMBER).not())
                .alias(names::GERMANY_INACTIVE),
            col(columns::BALANCE)
                .eq(lit(0.0))
                .alias(names::HAS_ZERO_BALANCE),
        ])
        .with_columns(flag_casts.chain(categorical_casts).collect::<Vec<_>>())
}

/// V2 stage: runs [`v1_stage`] and adds `is_mature_inactive_transit`.
pub fn v2_stage(lf: LazyFrame) -> LazyFrame {
    v1_stage(lf).with_column(
        col(names::HAS_ZERO_BALANCE)
            .eq(lit(1i32))
            .and(col(columns::IS_ACTIVE_MEMBER).eq(lit(0i32)))
            .and(col(columns::AGE).gt(lit(40i64)))
            .cast(DataType::Int32)
            .alias(names::IS_MATURE_INACTIVE_TRANSIT),
    )
}

fn validate_raw(raw: &DataFrame, context: TransformContext) -> Result<(), FeatureError> {
    check_layout(raw)?;

    match (context, has_column(raw, columns::LABEL)) {
        (TransformContext::Training, false) => {
            return Err(FeatureError::MissingColumn {
                column: columns::LABEL.to_string(),
            });
        }
        (TransformContext::Inference, true) => {
            return Err(FeatureError::UnexpectedColumn {
                column: columns::LABEL.to_string(),
                reason: "label column is not accepted at inference",
            });
        }
        _ => {}
    }

    check_values(raw)
}

fn normalize(lf: LazyFrame) -> LazyFrame {
    lf.with_columns(
        RAW_LAYOUT
            .iter()
            .map(|(name, kind)| col(*name).cast(kind.normalized()))
            .collect::<Vec<_>>(),
    )
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

fn in_germany() -> Expr {
    col(columns::GEOGRAPHY).eq(lit(Geography::Germany.label()))
}

/// Male -> 0, Female -> 1, anything else -> null.
fn encode_gender() -> Expr {
    col(columns::GENDER)
        .apply(
            |c: Column| {
                let codes: Int32Chunked = c
                    .as_materialized_series()
                    .str()?
                    .into_iter()
                    .map(|raw| raw.and_then(|g| Gender::encode(g).known()).map(|g| g.code()))
                    .collect();
                Ok(Some(codes.into_series().into()))
            },
            GetOutput::from_type(DataType::Int32),
        )
        .alias(columns::GENDER)
}

fn age_bucket() -> Expr {
    col(columns::AGE)
        .apply(
            |c: Column| {
                let buckets: StringChunked = c
                    .as_materialized_series()
                    .i64()?
                    .into_iter()
                    .map(|age| age.and_then(|a| AgeBucket::from_age(a).known()).map(|b| b.label()))
                    .collect();
                Ok(Some(buckets.into_series().into()))
            },
            GetOutput::from_type(DataType::String),
        )
        .alias(names::AGE_BUCKET)
}

fn tenure_log() -> Expr {
    col(columns::TENURE)
        .apply(
            |c: Column| {
                let logs: Float64Chunked = c
                    .as_materialized_series()
                    .i64()?
                    .into_iter()
                    .map(|tenure| tenure.map(encoding::tenure_log))
                    .collect();
                Ok(Some(logs.into_series().into()))
            },
            GetOutput::from_type(DataType::Float64),
        )
        .alias(names::TENURE_LOG)
}
