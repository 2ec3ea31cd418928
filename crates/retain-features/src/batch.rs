//! Engineered batches and row views.

use crate::error::FeatureError;
use crate::schema::{FeatureKind, FeatureSchema};
use polars::prelude::*;
use std::fmt;

/// One engineered cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// Integer or 0/1 flag
    Integer(i64),
    /// Float
    Float(f64),
    /// Categorical label
    Category(String),
    /// Missing value
    Missing,
}

impl FeatureValue {
    /// Numeric view; `None` for categories and missing values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Category(_) | Self::Missing => None,
        }
    }

    /// Categorical label, if any.
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Self::Category(label) => Some(label),
            _ => None,
        }
    }

    /// Whether the cell is missing.
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:.4}"),
            Self::Category(label) => write!(f, "{label}"),
            Self::Missing => write!(f, "NA"),
        }
    }
}

/// Engineered values of one row, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow(Vec<FeatureValue>);

impl FeatureRow {
    /// Values in schema order.
    pub fn values(&self) -> &[FeatureValue] {
        &self.0
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row has no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<FeatureValue>> for FeatureRow {
    fn from(values: Vec<FeatureValue>) -> Self {
        Self(values)
    }
}

/// Output of the transformer: a frame laid out exactly as its schema.
#[derive(Debug, Clone)]
pub struct EngineeredBatch {
    schema: FeatureSchema,
    frame: DataFrame,
}

impl EngineeredBatch {
    pub(crate) const fn new(schema: FeatureSchema, frame: DataFrame) -> Self {
        Self { schema, frame }
    }

    /// Layout of the batch.
    pub const fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Underlying frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    /// Whether the batch has no rows.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Column names in order.
    pub fn feature_names(&self) -> Vec<&'static str> {
        self.schema.names()
    }

    /// Sub-batch of `len` rows starting at `offset`.
    pub fn slice(&self, offset: usize, len: usize) -> Self {
        Self {
            schema: self.schema.clone(),
            frame: self.frame.slice(offset as i64, len),
        }
    }

    /// Values of a single column.
    pub fn column_values(&self, name: &str) -> Result<Vec<FeatureValue>, FeatureError> {
        let kind = self
            .schema
            .features()
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.kind)
            .ok_or_else(|| FeatureError::MissingColumn {
                column: name.to_string(),
            })?;
        extract_column(&self.frame, name, kind)
    }

    /// All rows, in order.
    pub fn rows(&self) -> Result<Vec<FeatureRow>, FeatureError> {
        let columns = self
            .schema
            .features()
            .iter()
            .map(|f| extract_column(&self.frame, f.name, f.kind))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = (0..self.len())
            .map(|i| FeatureRow(columns.iter().map(|c| c[i].clone()).collect()))
            .collect();
        Ok(rows)
    }

    /// Row at `index`.
    pub fn row(&self, index: usize) -> Result<FeatureRow, FeatureError> {
        if index >= self.len() {
            return Err(FeatureError::RowOutOfBounds {
                index,
                len: self.len(),
            });
        }
        let mut rows = self.slice(index, 1).rows()?;
        rows.pop().ok_or(FeatureError::RowOutOfBounds {
            index,
            len: self.len(),
        })
    }
}

fn extract_column(
    frame: &DataFrame,
    name: &str,
    kind: FeatureKind,
) -> Result<Vec<FeatureValue>, FeatureError> {
    let column = frame.column(name).map_err(|_| FeatureError::MissingColumn {
        column: name.to_string(),
    })?;

    let values = match kind {
        FeatureKind::Integer | FeatureKind::Flag => {
            let cast = column.cast(&DataType::Int64)?;
            cast.as_materialized_series()
                .i64()?
                .into_iter()
                .map(|v| v.map_or(FeatureValue::Missing, FeatureValue::Integer))
                .collect()
        }
        FeatureKind::Float => column
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|v| v.map_or(FeatureValue::Missing, FeatureValue::Float))
            .collect(),
        FeatureKind::Categorical(_) => {
            let cast = column.cast(&DataType::String)?;
            cast.as_materialized_series()
                .str()?
                .into_iter()
                .map(|v| v.map_or(FeatureValue::Missing, |s| FeatureValue::Category(s.to_string())))
                .collect()
        }
    };
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FeatureTransformer, TransformConfig};
    use retain_data::RawCustomerRecord;

    fn records(n: usize) -> Vec<RawCustomerRecord> {
        (0..n)
            .map(|i| RawCustomerRecord {
                customer_id: Some(1000 + i as i64),
                surname: None,
                credit_score: 600 + i as i64,
                geography: "France".to_string(),
                gender: "Male".to_string(),
                age: 20 + 10 * i as i64,
                tenure: i as i64,
                balance: 1000.0 * i as f64,
                num_products: 1,
                has_credit_card: true,
                is_active_member: true,
                estimated_salary: 50_000.0,
            })
            .collect()
    }

    #[test]
    fn test_row_out_of_bounds() {
        let batch = FeatureTransformer::new(TransformConfig::default())
            .transform_records(&records(2))
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert!(matches!(
            batch.row(2),
            Err(FeatureError::RowOutOfBounds { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_slice_matches_rows() {
        let batch = FeatureTransformer::default()
            .transform_records(&records(4))
            .unwrap();
        let rows = batch.rows().unwrap();
        let slice = batch.slice(1, 2);
        assert_eq!(slice.len(), 2);
        assert_eq!(slice.rows().unwrap(), rows[1..3].to_vec());
        assert_eq!(batch.row(3).unwrap(), rows[3]);
    }

    #[test]
    fn test_feature_value_views() {
        assert_eq!(FeatureValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(FeatureValue::Category("mid".into()).as_category(), Some("mid"));
        assert_eq!(FeatureValue::Category("mid".into()).as_f64(), None);
        assert!(FeatureValue::Missing.is_missing());
        assert_eq!(FeatureValue::Missing.to_string(), "NA");
    }
}
