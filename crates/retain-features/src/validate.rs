//! Raw input validation.
//!
//! A raw value is usable only when every derived feature has a defined value
//! for it: ages fall in an age bin, tenures are non-negative, the country is
//! one the model knows and money amounts are finite. The same rules apply to
//! typed records and to raw frames.

use crate::encoding::{AgeBucket, Geography};
use crate::error::FeatureError;
use polars::prelude::*;
use retain_data::{RawCustomerRecord, RecordBatch, RowError, columns};

/// Dtype class a raw column must belong to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RawKind {
    Integer,
    Numeric,
    Flag,
    Text,
}

impl RawKind {
    pub(crate) const fn describe(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Numeric => "numeric",
            Self::Flag => "boolean or integer",
            Self::Text => "string",
        }
    }

    pub(crate) fn accepts(self, dtype: &DataType) -> bool {
        match self {
            Self::Integer => dtype.is_integer(),
            Self::Numeric => dtype.is_integer() || dtype.is_float(),
            Self::Flag => dtype.is_integer() || matches!(dtype, DataType::Boolean),
            Self::Text => matches!(dtype, DataType::String),
        }
    }

    pub(crate) fn normalized(self) -> DataType {
        match self {
            Self::Integer => DataType::Int64,
            Self::Numeric => DataType::Float64,
            Self::Flag => DataType::Boolean,
            Self::Text => DataType::String,
        }
    }
}

pub(crate) const RAW_LAYOUT: &[(&str, RawKind)] = &[
    (columns::CREDIT_SCORE, RawKind::Integer),
    (columns::GEOGRAPHY, RawKind::Text),
    (columns::GENDER, RawKind::Text),
    (columns::AGE, RawKind::Integer),
    (columns::TENURE, RawKind::Integer),
    (columns::BALANCE, RawKind::Numeric),
    (columns::NUM_PRODUCTS, RawKind::Integer),
    (columns::HAS_CREDIT_CARD, RawKind::Flag),
    (columns::IS_ACTIVE_MEMBER, RawKind::Flag),
    (columns::ESTIMATED_SALARY, RawKind::Numeric),
];

fn geography_rule(country: &str) -> Option<&'static str> {
    (!Geography::encode(country).is_known()).then_some("unknown country")
}

fn age_rule(age: i64) -> Option<&'static str> {
    (!AgeBucket::from_age(age).is_known()).then_some("age is negative")
}

fn tenure_rule(tenure: i64) -> Option<&'static str> {
    (tenure < 0).then_some("tenure is negative")
}

fn amount_rule(amount: f64) -> Option<&'static str> {
    (!amount.is_finite()).then_some("amount is not finite")
}

/// Check that a record's values can be transformed.
///
/// # Errors
///
/// Returns [`FeatureError::InvalidValue`] naming the first offending field.
pub fn check_record(record: &RawCustomerRecord) -> Result<(), FeatureError> {
    let checks = [
        (columns::GEOGRAPHY, geography_rule(&record.geography)),
        (columns::AGE, age_rule(record.age)),
        (columns::TENURE, tenure_rule(record.tenure)),
        (columns::BALANCE, amount_rule(record.balance)),
        (columns::ESTIMATED_SALARY, amount_rule(record.estimated_salary)),
    ];

    match checks
        .into_iter()
        .find_map(|(column, reason)| reason.map(|reason| (column, reason)))
    {
        Some((column, reason)) => Err(FeatureError::InvalidValue {
            column: column.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Move records that fail [`check_record`] into the batch's row errors.
///
/// Errors stay ordered by row.
pub fn screen_records(batch: &RecordBatch) -> RecordBatch {
    let mut screened = RecordBatch {
        records: Vec::with_capacity(batch.len()),
        errors: batch.errors.clone(),
    };

    for (row, record) in &batch.records {
        match check_record(record) {
            Ok(()) => screened.records.push((*row, record.clone())),
            Err(e) => {
                tracing::warn!(row, customer_id = ?record.customer_id, error = %e, "rejected record");
                screened
                    .errors
                    .push(RowError::new(*row, record.customer_id, e.to_string()));
            }
        }
    }

    screened.errors.sort_by_key(|e| e.row);
    screened
}

/// Check raw columns for presence and dtype class.
pub(crate) fn check_layout(raw: &DataFrame) -> Result<(), FeatureError> {
    for (name, kind) in RAW_LAYOUT {
        let column = raw.column(name).map_err(|_| FeatureError::MissingColumn {
            column: name.to_string(),
        })?;
        if !kind.accepts(column.dtype()) {
            return Err(FeatureError::InvalidColumn {
                column: name.to_string(),
                expected: kind.describe(),
                found: column.dtype().to_string(),
            });
        }
    }
    Ok(())
}

/// Check raw cells for nulls and out-of-domain values.
///
/// Expects [`check_layout`] to have passed.
pub(crate) fn check_values(raw: &DataFrame) -> Result<(), FeatureError> {
    for (name, kind) in RAW_LAYOUT {
        let values = normalized(raw, name, *kind)?;
        reject(name, flagged(&values.is_null(), |null| null.then_some("null value")))?;
    }

    let geography = normalized(raw, columns::GEOGRAPHY, RawKind::Text)?;
    reject(columns::GEOGRAPHY, flagged(geography.str()?, geography_rule))?;

    let age = normalized(raw, columns::AGE, RawKind::Integer)?;
    reject(columns::AGE, flagged(age.i64()?, age_rule))?;

    let tenure = normalized(raw, columns::TENURE, RawKind::Integer)?;
    reject(columns::TENURE, flagged(tenure.i64()?, tenure_rule))?;

    for name in [columns::BALANCE, columns::ESTIMATED_SALARY] {
        let amounts = normalized(raw, name, RawKind::Numeric)?;
        reject(name, flagged(amounts.f64()?, amount_rule))?;
    }
    Ok(())
}

fn normalized(raw: &DataFrame, name: &str, kind: RawKind) -> PolarsResult<Series> {
    Ok(raw
        .column(name)?
        .cast(&kind.normalized())?
        .take_materialized_series())
}

/// 1-based rows whose value breaks `rule`, with the rule's reason.
fn flagged<T>(
    values: impl IntoIterator<Item = Option<T>>,
    rule: impl Fn(T) -> Option<&'static str>,
) -> Option<(&'static str, Vec<usize>)> {
    let mut found: Option<(&'static str, Vec<usize>)> = None;
    for (i, value) in values.into_iter().enumerate() {
        if let Some(reason) = value.and_then(&rule) {
            found.get_or_insert((reason, Vec::new())).1.push(i + 1);
        }
    }
    found
}

fn reject(column: &str, found: Option<(&'static str, Vec<usize>)>) -> Result<(), FeatureError> {
    match found {
        Some((reason, rows)) => Err(FeatureError::InvalidValues {
            column: column.to_string(),
            reason,
            rows,
        }),
        None => Ok(()),
    }
}
