//! Single-record JSON request bodies.
//!
//! Form front-ends send every value as a string, API clients send numbers and
//! booleans; both are accepted, anything else is a validation error.

use crate::error::{DataError, Result};
use crate::parse::{parse_float, parse_flag, parse_int, parse_text};
use crate::record::RawCustomerRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON body of a single-customer prediction request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    /// Optional customer identifier
    #[serde(default)]
    pub customer_id: Option<Value>,
    /// Optional surname
    #[serde(default)]
    pub surname: Option<String>,
    /// Credit score
    #[serde(default)]
    pub credit_score: Option<Value>,
    /// Country of residence
    #[serde(default)]
    pub geography: Option<Value>,
    /// Gender
    #[serde(default)]
    pub gender: Option<Value>,
    /// Age in years
    #[serde(default)]
    pub age: Option<Value>,
    /// Tenure in years
    #[serde(default)]
    pub tenure: Option<Value>,
    /// Account balance
    #[serde(default)]
    pub balance: Option<Value>,
    /// Number of products
    #[serde(default)]
    pub num_of_products: Option<Value>,
    /// Credit card flag
    #[serde(default)]
    pub has_cr_card: Option<Value>,
    /// Active member flag
    #[serde(default)]
    pub active: Option<Value>,
    /// Estimated salary
    #[serde(default)]
    pub salary: Option<Value>,
}

impl PredictionRequest {
    /// Parse a request body.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Convert into a typed record.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::MissingField`] or [`DataError::InvalidField`]
    /// naming the first offending field.
    pub fn into_record(self) -> Result<RawCustomerRecord> {
        let customer_id = match self.customer_id {
            None | Some(Value::Null) => None,
            Some(v) => Some(parse_int("customerId", &integer_text("customerId", &v)?)?),
        };

        Ok(RawCustomerRecord {
            customer_id,
            surname: self.surname.filter(|s| !s.trim().is_empty()),
            credit_score: int_field("creditScore", self.credit_score.as_ref())?,
            geography: text_field("geography", self.geography.as_ref())?,
            gender: text_field("gender", self.gender.as_ref())?,
            age: int_field("age", self.age.as_ref())?,
            tenure: int_field("tenure", self.tenure.as_ref())?,
            balance: float_field("balance", self.balance.as_ref())?,
            num_products: int_field("numOfProducts", self.num_of_products.as_ref())?,
            has_credit_card: flag_field("hasCrCard", self.has_cr_card.as_ref())?,
            is_active_member: flag_field("active", self.active.as_ref())?,
            estimated_salary: float_field("salary", self.salary.as_ref())?,
        })
    }
}

fn required_text(field: &str, value: &Value) -> Result<String> {
    match value {
        Value::Null => Err(DataError::MissingField(field.to_string())),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(DataError::invalid(field, other.to_string(), "scalar value")),
    }
}

/// Largest magnitude below which every integer is exact in an `f64`.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Like [`required_text`], but JSON numbers with no fractional part
/// (`42.0`) are written as integers.
fn integer_text(field: &str, value: &Value) -> Result<String> {
    match value {
        Value::Number(n) if !n.is_i64() => match n.as_f64() {
            Some(x) if x.fract() == 0.0 && x.abs() < MAX_EXACT_INT => Ok((x as i64).to_string()),
            _ => Ok(n.to_string()),
        },
        other => required_text(field, other),
    }
}

fn present<'a>(field: &str, value: Option<&'a Value>) -> Result<&'a Value> {
    value.ok_or_else(|| DataError::MissingField(field.to_string()))
}

fn int_field(field: &str, value: Option<&Value>) -> Result<i64> {
    parse_int(field, &integer_text(field, present(field, value)?)?)
}

fn float_field(field: &str, value: Option<&Value>) -> Result<f64> {
    parse_float(field, &required_text(field, present(field, value)?)?)
}

fn text_field(field: &str, value: Option<&Value>) -> Result<String> {
    parse_text(field, &required_text(field, present(field, value)?)?)
}

fn flag_field(field: &str, value: Option<&Value>) -> Result<bool> {
    parse_flag(field, &required_text(field, present(field, value)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_strings_are_accepted() {
        let body = r#"{
            "creditScore": "619", "geography": "France", "gender": "Female",
            "age": "42", "tenure": "2", "balance": "0", "numOfProducts": "1",
            "hasCrCard": true, "active": false, "salary": "101348.88"
        }"#;
        let record = PredictionRequest::from_json(body)
            .unwrap()
            .into_record()
            .unwrap();
        assert_eq!(record.credit_score, 619);
        assert_eq!(record.age, 42);
        assert!(record.has_credit_card);
        assert!(!record.is_active_member);
        assert_eq!(record.customer_id, None);
    }

    #[test]
    fn test_json_numbers_are_accepted() {
        let body = r#"{
            "customerId": 15634602, "surname": "Hargrave",
            "creditScore": 619, "geography": "France", "gender": "Female",
            "age": 42, "tenure": 2, "balance": 0.0, "numOfProducts": 1,
            "hasCrCard": 1, "active": 1, "salary": 101348.88
        }"#;
        let record = PredictionRequest::from_json(body)
            .unwrap()
            .into_record()
            .unwrap();
        assert_eq!(record.customer_id, Some(15_634_602));
        assert_eq!(record.estimated_salary, 101_348.88);
        assert!(record.is_active_member);
    }

    #[test]
    fn test_missing_field_is_named() {
        let body = r#"{ "creditScore": 619, "geography": "France" }"#;
        let err = PredictionRequest::from_json(body)
            .unwrap()
            .into_record()
            .unwrap_err();
        assert!(matches!(err, DataError::MissingField(ref f) if f == "gender"));
    }

    #[test]
    fn test_non_integer_age_is_rejected() {
        let body = r#"{
            "creditScore": 619, "geography": "France", "gender": "Female",
            "age": "42.5", "tenure": 2, "balance": 0, "numOfProducts": 1,
            "hasCrCard": true, "active": true, "salary": 1000
        }"#;
        let err = PredictionRequest::from_json(body)
            .unwrap()
            .into_record()
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidField { ref field, .. } if field == "age"));
    }

    #[test]
    fn test_whole_json_floats_are_integers() {
        let body = r#"{
            "customerId": 15634602.0,
            "creditScore": 619.0, "geography": "France", "gender": "Female",
            "age": 42.0, "tenure": 2.0, "balance": 0, "numOfProducts": 1.0,
            "hasCrCard": true, "active": true, "salary": 1000
        }"#;
        let record = PredictionRequest::from_json(body)
            .unwrap()
            .into_record()
            .unwrap();
        assert_eq!(record.customer_id, Some(15_634_602));
        assert_eq!(record.credit_score, 619);
        assert_eq!(record.age, 42);
        assert_eq!(record.tenure, 2);
        assert_eq!(record.num_products, 1);
    }

    #[test]
    fn test_fractional_json_float_is_rejected() {
        let body = r#"{
            "creditScore": 619, "geography": "France", "gender": "Female",
            "age": 42.5, "tenure": 2, "balance": 0, "numOfProducts": 1,
            "hasCrCard": true, "active": true, "salary": 1000
        }"#;
        let err = PredictionRequest::from_json(body)
            .unwrap()
            .into_record()
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidField { ref field, .. } if field == "age"));
    }
}
