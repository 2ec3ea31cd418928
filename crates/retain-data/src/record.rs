//! Customer records and batch bookkeeping types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A customer as received, before any feature engineering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCustomerRecord {
    /// Bank-side identifier, when known.
    pub customer_id: Option<i64>,
    /// Surname, when known.
    pub surname: Option<String>,
    /// Credit score.
    pub credit_score: i64,
    /// Country of residence (e.g. "France", "Germany", "Spain").
    pub geography: String,
    /// Gender as entered ("Male" / "Female").
    pub gender: String,
    /// Age in years.
    pub age: i64,
    /// Tenure in years.
    pub tenure: i64,
    /// Account balance.
    pub balance: f64,
    /// Number of bank products held.
    pub num_products: i64,
    /// Whether the customer holds a credit card.
    pub has_credit_card: bool,
    /// Whether the customer is an active member.
    pub is_active_member: bool,
    /// Estimated annual salary.
    pub estimated_salary: f64,
}

impl RawCustomerRecord {
    /// Reference to this record at the given 1-based row.
    pub fn reference(&self, row: usize) -> CustomerRef {
        CustomerRef {
            row,
            customer_id: self.customer_id,
            surname: self.surname.clone(),
        }
    }
}

/// Identifies a customer inside a batch result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    /// 1-based data row in the originating input.
    pub row: usize,
    /// Customer identifier, when present.
    pub customer_id: Option<i64>,
    /// Surname, when present.
    pub surname: Option<String>,
}

impl CustomerRef {
    /// Case-insensitive substring match against identifier or surname.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        let id_match = self
            .customer_id
            .is_some_and(|id| id.to_string().contains(&term));
        let surname_match = self
            .surname
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(&term));
        id_match || surname_match
    }
}

impl fmt::Display for CustomerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.customer_id, &self.surname) {
            (Some(id), Some(name)) => write!(f, "{} ({})", id, name),
            (Some(id), None) => write!(f, "{}", id),
            (None, Some(name)) => write!(f, "row {} ({})", self.row, name),
            (None, None) => write!(f, "row {}", self.row),
        }
    }
}

/// A per-row failure recorded while processing a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based data row.
    pub row: usize,
    /// Customer identifier, if it could be read.
    pub customer_id: Option<i64>,
    /// Human-readable cause.
    pub message: String,
}

impl RowError {
    /// Create a new row error.
    pub fn new(row: usize, customer_id: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            row,
            customer_id,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.customer_id {
            Some(id) => write!(f, "row {} (customer {}): {}", self.row, id, self.message),
            None => write!(f, "row {}: {}", self.row, self.message),
        }
    }
}

/// Records that parsed cleanly plus the rows that did not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBatch {
    /// Valid records with their 1-based row numbers.
    pub records: Vec<(usize, RawCustomerRecord)>,
    /// Rows excluded during ingestion.
    pub errors: Vec<RowError>,
}

impl RecordBatch {
    /// Build a batch from already-typed records, numbering rows from 1.
    pub fn from_records(records: Vec<RawCustomerRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .enumerate()
                .map(|(i, r)| (i + 1, r))
                .collect(),
            errors: Vec::new(),
        }
    }

    /// Number of valid records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no valid records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
