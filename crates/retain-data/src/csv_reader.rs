//! CSV batch ingestion.
//!
//! The header must carry every required column; individual rows that fail to
//! parse are excluded and reported without aborting the batch.

use crate::columns;
use crate::error::{DataError, Result};
use crate::parse::{
    parse_float, parse_flag, parse_int, parse_optional_int, parse_optional_text, parse_text,
};
use crate::record::{RawCustomerRecord, RecordBatch, RowError};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Header positions of the columns a customer record is built from.
#[derive(Debug)]
struct HeaderIndex {
    positions: HashMap<&'static str, usize>,
}

impl HeaderIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut positions = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            let name = name.trim();
            if let Some(known) = columns::REQUIRED
                .iter()
                .chain(columns::IDENTIFYING)
                .find(|c| **c == name)
            {
                positions.entry(*known).or_insert(idx);
            }
        }

        let missing: Vec<String> = columns::REQUIRED
            .iter()
            .filter(|c| !positions.contains_key(*c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataError::MissingColumns(missing));
        }

        Ok(Self { positions })
    }

    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.positions.get(column).and_then(|&i| record.get(i))
    }

    fn required<'r>(&self, record: &'r StringRecord, column: &str) -> Result<&'r str> {
        self.get(record, column)
            .ok_or_else(|| DataError::MissingField(column.to_string()))
    }

    fn parse(&self, record: &StringRecord) -> Result<RawCustomerRecord> {
        Ok(RawCustomerRecord {
            customer_id: parse_optional_int(
                columns::CUSTOMER_ID,
                self.get(record, columns::CUSTOMER_ID),
            )?,
            surname: parse_optional_text(self.get(record, columns::SURNAME)),
            credit_score: parse_int(
                columns::CREDIT_SCORE,
                self.required(record, columns::CREDIT_SCORE)?,
            )?,
            geography: parse_text(
                columns::GEOGRAPHY,
                self.required(record, columns::GEOGRAPHY)?,
            )?,
            gender: parse_text(columns::GENDER, self.required(record, columns::GENDER)?)?,
            age: parse_int(columns::AGE, self.required(record, columns::AGE)?)?,
            tenure: parse_int(columns::TENURE, self.required(record, columns::TENURE)?)?,
            balance: parse_float(columns::BALANCE, self.required(record, columns::BALANCE)?)?,
            num_products: parse_int(
                columns::NUM_PRODUCTS,
                self.required(record, columns::NUM_PRODUCTS)?,
            )?,
            has_credit_card: parse_flag(
                columns::HAS_CREDIT_CARD,
                self.required(record, columns::HAS_CREDIT_CARD)?,
            )?,
            is_active_member: parse_flag(
                columns::IS_ACTIVE_MEMBER,
                self.required(record, columns::IS_ACTIVE_MEMBER)?,
            )?,
            estimated_salary: parse_float(
                columns::ESTIMATED_SALARY,
                self.required(record, columns::ESTIMATED_SALARY)?,
            )?,
        })
    }
}

/// Read customer records from CSV.
///
/// # Errors
///
/// Fails only when the header lacks a required column or the underlying
/// reader fails; malformed rows end up in [`RecordBatch::errors`].
pub fn read_records<R: Read>(reader: R) -> Result<RecordBatch> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let index = HeaderIndex::from_headers(rdr.headers()?)?;
    let mut batch = RecordBatch::default();

    for (i, result) in rdr.records().enumerate() {
        let row = i + 1;
        let record = match result {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                batch.errors.push(RowError::new(row, None, e.to_string()));
                continue;
            }
        };

        match index.parse(&record) {
            Ok(customer) => batch.records.push((row, customer)),
            Err(e) => {
                let customer_id = index
                    .get(&record, columns::CUSTOMER_ID)
                    .and_then(|v| v.trim().parse().ok());
                batch.errors.push(RowError::new(row, customer_id, e.to_string()));
            }
        }
    }

    if !batch.errors.is_empty() {
        tracing::warn!(
            valid = batch.records.len(),
            rejected = batch.errors.len(),
            "excluded malformed rows from batch"
        );
    }

    Ok(batch)
}

/// Read customer records from a CSV file.
pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<RecordBatch> {
    read_records(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "RowNumber,CustomerId,Surname,CreditScore,Geography,Gender,Age,Tenure,Balance,NumOfProducts,HasCrCard,IsActiveMember,EstimatedSalary,Exited";

    #[test]
    fn test_reads_training_layout() {
        let csv = format!(
            "{HEADER}\n1,15634602,Hargrave,619,France,Female,42,2,0.0,1,1,1,101348.88,1\n"
        );
        let batch = read_records(csv.as_bytes()).unwrap();
        assert_eq!(batch.len(), 1);
        assert!(batch.errors.is_empty());

        let (row, record) = &batch.records[0];
        assert_eq!(*row, 1);
        assert_eq!(record.customer_id, Some(15_634_602));
        assert_eq!(record.surname.as_deref(), Some("Hargrave"));
        assert_eq!(record.credit_score, 619);
        assert!(record.has_credit_card);
        assert_eq!(record.balance, 0.0);
    }

    #[test]
    fn test_missing_header_aborts() {
        let csv = "CustomerId,CreditScore,Geography\n1,600,France\n";
        let err = read_records(csv.as_bytes()).unwrap_err();
        match err {
            DataError::MissingColumns(cols) => {
                assert!(cols.contains(&"Gender".to_string()));
                assert!(cols.contains(&"EstimatedSalary".to_string()));
                assert!(!cols.contains(&"Geography".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_row_is_excluded() {
        let csv = format!(
            "{HEADER}\n\
             1,1,Ada,600,France,Male,30,3,100.0,2,1,0,5000.0,0\n\
             2,2,Bob,600,Spain,Male,thirty,3,100.0,2,1,0,5000.0,0\n\
             3,3,Cy,700,Germany,Female,50,1,0.0,1,0,0,7000.0,1\n"
        );
        let batch = read_records(csv.as_bytes()).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.errors.len(), 1);

        let error = &batch.errors[0];
        assert_eq!(error.row, 2);
        assert_eq!(error.customer_id, Some(2));
        assert!(error.message.contains("Age"));
        assert_eq!(batch.records[1].0, 3);
    }

    #[test]
    fn test_short_row_is_excluded() {
        let csv = format!("{HEADER}\n1,1,Ada,600,France\n");
        let batch = read_records(csv.as_bytes()).unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.errors.len(), 1);
        assert!(batch.errors[0].message.contains("Missing required field"));
    }

    #[test]
    fn test_identifying_columns_are_optional() {
        let csv = "CreditScore,Geography,Gender,Age,Tenure,Balance,NumOfProducts,HasCrCard,IsActiveMember,EstimatedSalary\n\
                   650,Spain,Male,35,5,1000.5,2,0,1,40000\n";
        let batch = read_records(csv.as_bytes()).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.records[0].1.customer_id, None);
        assert_eq!(batch.records[0].1.surname, None);
    }
}
