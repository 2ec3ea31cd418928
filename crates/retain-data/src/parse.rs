//! Typed conversion of raw text fields.
//!
//! Every conversion is strict: a value that does not represent the declared
//! type is an error naming the field, never a default.

use crate::error::{DataError, Result};

/// Parse an integral field. `"42"` is accepted, `"42.5"` and `"abc"` are not.
pub fn parse_int(field: &str, raw: &str) -> Result<i64> {
    let trimmed = non_empty(field, raw)?;
    trimmed
        .parse::<i64>()
        .map_err(|_| DataError::invalid(field, raw, "integer"))
}

/// Parse a finite floating point field.
pub fn parse_float(field: &str, raw: &str) -> Result<f64> {
    let trimmed = non_empty(field, raw)?;
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DataError::invalid(field, raw, "finite number")),
    }
}

/// Parse a 0/1 flag. Accepts `true`/`false`, `1`/`0` and `1.0`/`0.0`.
pub fn parse_flag(field: &str, raw: &str) -> Result<bool> {
    let trimmed = non_empty(field, raw)?;
    match trimmed.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" => Ok(true),
        "0" | "0.0" | "false" => Ok(false),
        _ => Err(DataError::invalid(field, raw, "flag (0/1 or true/false)")),
    }
}

/// Parse a required text field.
pub fn parse_text(field: &str, raw: &str) -> Result<String> {
    non_empty(field, raw).map(str::to_string)
}

/// Parse an optional text field; blank means absent.
pub fn parse_optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse an optional integral field; blank means absent, garbage is an error.
pub fn parse_optional_int(field: &str, raw: Option<&str>) -> Result<Option<i64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => parse_int(field, value).map(Some),
        None => Ok(None),
    }
}

fn non_empty<'a>(field: &str, raw: &'a str) -> Result<&'a str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(DataError::MissingField(field.to_string()))
    } else {
        Ok(trimmed)
    }
}
