//! Raw record to DataFrame conversion.

use crate::error::FeatureError;
use polars::prelude::*;
use retain_data::{RawCustomerRecord, columns};

/// Build a raw customer frame with the training-time column names.
///
/// Flags are stored as booleans, identifiers as nullable columns.
pub fn records_to_frame(records: &[RawCustomerRecord]) -> Result<DataFrame, FeatureError> {
    let customer_id: Vec<Option<i64>> = records.iter().map(|r| r.customer_id).collect();
    let surname: Vec<Option<&str>> = records.iter().map(|r| r.surname.as_deref()).collect();
    let credit_score: Vec<i64> = records.iter().map(|r| r.credit_score).collect();
    let geography: Vec<&str> = records.iter().map(|r| r.geography.as_str()).collect();
    let gender: Vec<&str> = records.iter().map(|r| r.gender.as_str()).collect();
    let age: Vec<i64> = records.iter().map(|r| r.age).collect();
    let tenure: Vec<i64> = records.iter().map(|r| r.tenure).collect();
    let balance: Vec<f64> = records.iter().map(|r| r.balance).collect();
    let num_products: Vec<i64> = records.iter().map(|r| r.num_products).collect();
    let has_credit_card: Vec<bool> = records.iter().map(|r| r.has_credit_card).collect();
    let is_active_member: Vec<bool> = records.iter().map(|r| r.is_active_member).collect();
    let estimated_salary: Vec<f64> = records.iter().map(|r| r.estimated_salary).collect();

    let df = DataFrame::new(vec![
        Column::new(columns::CUSTOMER_ID.into(), customer_id),
        Column::new(columns::SURNAME.into(), surname),
        Column::new(columns::CREDIT_SCORE.into(), credit_score),
        Column::new(columns::GEOGRAPHY.into(), geography),
        Column::new(columns::GENDER.into(), gender),
        Column::new(columns::AGE.into(), age),
        Column::new(columns::TENURE.into(), tenure),
        Column::new(columns::BALANCE.into(), balance),
        Column::new(columns::NUM_PRODUCTS.into(), num_products),
        Column::new(columns::HAS_CREDIT_CARD.into(), has_credit_card),
        Column::new(columns::IS_ACTIVE_MEMBER.into(), is_active_member),
        Column::new(columns::ESTIMATED_SALARY.into(), estimated_salary),
    ])?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RawCustomerRecord {
        RawCustomerRecord {
            customer_id: None,
            surname: Some("Hill".to_string()),
            credit_score: 608,
            geography: "Spain".to_string(),
            gender: "Female".to_string(),
            age: 41,
            tenure: 1,
            balance: 83_807.86,
            num_products: 1,
            has_credit_card: false,
            is_active_member: true,
            estimated_salary: 112_542.58,
        }
    }

    #[test]
    fn test_frame_shape() {
        let df = records_to_frame(&[record(), record()]).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 12);
        assert_eq!(
            df.column(columns::HAS_CREDIT_CARD).unwrap().dtype(),
            &DataType::Boolean
        );
        assert_eq!(df.column(columns::CUSTOMER_ID).unwrap().null_count(), 2);
    }

    #[test]
    fn test_empty_frame_keeps_columns() {
        let df = records_to_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert!(df.column(columns::ESTIMATED_SALARY).is_ok());
    }
}
