//! Retention Value Engine
//!
//! Converts a churn probability into the economics of a retention offer.
//!
//! For one customer:
//!
//! ```text
//! annual_profit       = balance * 0.02 + num_products * 50 + (card and active ? 30 : 0)
//! expected_lifespan   = min(1 / max(p, 1e-6), 10)
//! lifetime_value      = annual_profit * expected_lifespan
//! expected_net_return = lifetime_value * p * success_rate - retention_cost
//! ```
//!
//! A customer is actionable when the expected net return is strictly
//! positive. Candidates are ranked by expected net return, descending.

use crate::summary::RetentionSummary;
use retain_data::{CustomerRef, RawCustomerRecord, RowError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Net interest margin earned on the balance.
pub const NET_INTEREST_MARGIN: f64 = 0.02;

/// Annual profit per product held.
pub const PRODUCT_PROFIT: f64 = 50.0;

/// Annual profit from a credit card held by an active member.
pub const ACTIVE_CARD_PROFIT: f64 = 30.0;

/// Cap on the expected remaining relationship, in years.
pub const MAX_LIFESPAN_YEARS: f64 = 10.0;

/// Floor applied to the probability before inverting it.
pub const PROBABILITY_FLOOR: f64 = 1e-6;

/// Default cost of one retention offer.
pub const DEFAULT_RETENTION_COST: f64 = 500.0;

/// Default share of contacted customers who stay.
pub const DEFAULT_SUCCESS_RATE: f64 = 0.20;

/// Retention valuation errors
#[derive(Debug, Error)]
pub enum OutputError {
    /// Campaign parameters out of range
    #[error("Invalid retention config: {0}")]
    InvalidConfig(String),

    /// Customer inputs out of range
    #[error("Invalid customer input: {0}")]
    InvalidInput(String),

    /// Inputs of different lengths
    #[error("Length mismatch: {customers} customers, {probabilities} probabilities")]
    LengthMismatch {
        /// Number of customers
        customers: usize,
        /// Number of probabilities
        probabilities: usize,
    },
}

/// Campaign parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Cost of one retention offer
    pub retention_cost: f64,
    /// Share of contacted customers who stay, in `[0, 1]`
    pub expected_success_rate: f64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            retention_cost: DEFAULT_RETENTION_COST,
            expected_success_rate: DEFAULT_SUCCESS_RATE,
        }
    }
}

impl RetentionConfig {
    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), OutputError> {
        if !self.retention_cost.is_finite() || self.retention_cost < 0.0 {
            return Err(OutputError::InvalidConfig(format!(
                "retention cost must be finite and non-negative, got {}",
                self.retention_cost
            )));
        }
        if !(0.0..=1.0).contains(&self.expected_success_rate) {
            return Err(OutputError::InvalidConfig(format!(
                "success rate must be within [0, 1], got {}",
                self.expected_success_rate
            )));
        }
        Ok(())
    }
}

/// Raw account fields the valuation reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Account balance
    pub balance: f64,
    /// Number of products held
    pub num_products: i64,
    /// Holds a credit card
    pub has_credit_card: bool,
    /// Active member
    pub is_active_member: bool,
}

impl From<&RawCustomerRecord> for AccountSnapshot {
    fn from(record: &RawCustomerRecord) -> Self {
        Self {
            balance: record.balance,
            num_products: record.num_products,
            has_credit_card: record.has_credit_card,
            is_active_member: record.is_active_member,
        }
    }
}

impl AccountSnapshot {
    /// Yearly profit the bank earns from the customer.
    pub fn annual_profit(&self) -> f64 {
        let card = if self.has_credit_card && self.is_active_member {
            ACTIVE_CARD_PROFIT
        } else {
            0.0
        };
        self.balance * NET_INTEREST_MARGIN + self.num_products as f64 * PRODUCT_PROFIT + card
    }

    fn validate(&self) -> Result<(), OutputError> {
        if !self.balance.is_finite() || self.balance < 0.0 {
            return Err(OutputError::InvalidInput(format!(
                "balance must be finite and non-negative, got {}",
                self.balance
            )));
        }
        if self.num_products < 0 {
            return Err(OutputError::InvalidInput(format!(
                "number of products must be non-negative, got {}",
                self.num_products
            )));
        }
        Ok(())
    }
}

/// Expected remaining years of the relationship.
pub fn expected_lifespan(probability: f64) -> f64 {
    (1.0 / probability.max(PROBABILITY_FLOOR)).min(MAX_LIFESPAN_YEARS)
}

/// Full valuation of one customer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetentionValuation {
    /// Churn probability
    pub probability: f64,
    /// Yearly profit
    pub annual_profit: f64,
    /// Expected remaining years
    pub expected_lifespan: f64,
    /// Profit over the expected lifespan
    pub lifetime_value: f64,
    /// Expected value of making a retention offer
    pub expected_net_return: f64,
    /// Whether the offer is worth making
    pub recommended: bool,
}

/// Value one customer.
///
/// # Errors
///
/// Fails when the probability is outside `[0, 1]`, an account field is
/// negative or non-finite, or the config is invalid.
pub fn value_customer(
    probability: f64,
    account: &AccountSnapshot,
    config: &RetentionConfig,
) -> Result<RetentionValuation, OutputError> {
    config.validate()?;
    if !(0.0..=1.0).contains(&probability) {
        return Err(OutputError::InvalidInput(format!(
            "probability must be within [0, 1], got {probability}"
        )));
    }
    account.validate()?;

    let annual_profit = account.annual_profit();
    let expected_lifespan = expected_lifespan(probability);
    let lifetime_value = annual_profit * expected_lifespan;
    let expected_net_return =
        lifetime_value * probability * config.expected_success_rate - config.retention_cost;

    Ok(RetentionValuation {
        probability,
        annual_profit,
        expected_lifespan,
        lifetime_value,
        expected_net_return,
        recommended: expected_net_return > 0.0,
    })
}

/// Customer worth a retention offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionCandidate {
    /// Customer reference
    pub customer: CustomerRef,
    /// Churn probability
    pub probability: f64,
    /// Profit over the expected lifespan
    pub lifetime_value: f64,
    /// Expected value of making the offer
    pub expected_net_return: f64,
}

/// Customer to value: reference, account fields and probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAccount {
    /// Customer reference
    pub customer: CustomerRef,
    /// Raw account fields
    pub account: AccountSnapshot,
    /// Churn probability
    pub probability: f64,
}

/// Result of valuing a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionReport {
    /// Actionable customers, best first
    pub candidates: Vec<RetentionCandidate>,
    /// Campaign totals over the candidates
    pub summary: RetentionSummary,
    /// Customers that could not be valued
    pub errors: Vec<RowError>,
    /// Customers valued without error
    pub evaluated: usize,
}

/// Values batches of scored customers.
#[derive(Debug, Clone, Copy)]
pub struct RetentionValueEngine {
    config: RetentionConfig,
}

impl RetentionValueEngine {
    /// Create an engine for a campaign.
    pub fn new(config: RetentionConfig) -> Result<Self, OutputError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Campaign parameters.
    pub const fn config(&self) -> &RetentionConfig {
        &self.config
    }

    /// Value every customer and keep the actionable ones.
    ///
    /// A customer with invalid inputs becomes a [`RowError`]; the others are
    /// unaffected.
    pub fn evaluate(&self, accounts: &[ScoredAccount]) -> RetentionReport {
        let mut candidates = Vec::new();
        let mut errors = Vec::new();

        for scored in accounts {
            match value_customer(scored.probability, &scored.account, &self.config) {
                Ok(valuation) if valuation.recommended => candidates.push(RetentionCandidate {
                    customer: scored.customer.clone(),
                    probability: valuation.probability,
                    lifetime_value: valuation.lifetime_value,
                    expected_net_return: valuation.expected_net_return,
                }),
                Ok(_) => {}
                Err(e) => errors.push(RowError::new(
                    scored.customer.row,
                    scored.customer.customer_id,
                    e.to_string(),
                )),
            }
        }

        candidates.sort_by(|a, b| b.expected_net_return.total_cmp(&a.expected_net_return));

        if !errors.is_empty() {
            tracing::warn!(rejected = errors.len(), "customers could not be valued");
        }
        tracing::debug!(
            evaluated = accounts.len() - errors.len(),
            actionable = candidates.len(),
            "retention valuation complete"
        );

        RetentionReport {
            summary: RetentionSummary::from_candidates(&candidates, &self.config),
            evaluated: accounts.len() - errors.len(),
            candidates,
            errors,
        }
    }

    /// Value records against a parallel slice of probabilities.
    pub fn evaluate_records(
        &self,
        records: &[(usize, RawCustomerRecord)],
        probabilities: &[f64],
    ) -> Result<RetentionReport, OutputError> {
        if records.len() != probabilities.len() {
            return Err(OutputError::LengthMismatch {
                customers: records.len(),
                probabilities: probabilities.len(),
            });
        }

        let accounts: Vec<ScoredAccount> = records
            .iter()
            .zip(probabilities)
            .map(|((row, record), p)| ScoredAccount {
                customer: record.reference(*row),
                account: AccountSnapshot::from(record),
                probability: *p,
            })
            .collect();

        Ok(self.evaluate(&accounts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn account(balance: f64) -> AccountSnapshot {
        AccountSnapshot {
            balance,
            num_products: 2,
            has_credit_card: true,
            is_active_member: true,
        }
    }

    fn scored(row: usize, balance: f64, probability: f64) -> ScoredAccount {
        ScoredAccount {
            customer: CustomerRef {
                row,
                customer_id: Some(row as i64),
                surname: None,
            },
            account: account(balance),
            probability,
        }
    }

    #[test]
    fn test_break_even_example() {
        let v = value_customer(0.5, &account(100_000.0), &RetentionConfig::default()).unwrap();
        assert_relative_eq!(v.annual_profit, 2130.0);
        assert_relative_eq!(v.expected_lifespan, 2.0);
        assert_relative_eq!(v.lifetime_value, 4260.0);
        assert_relative_eq!(v.expected_net_return, -74.0, epsilon = 1e-9);
        assert!(!v.recommended);
    }

    #[test]
    fn test_high_probability_small_balance_not_actionable() {
        let v = value_customer(0.9, &account(100_000.0), &RetentionConfig::default()).unwrap();
        assert_relative_eq!(v.expected_lifespan, 1.0 / 0.9);
        assert_relative_eq!(v.lifetime_value, 2366.666_666, epsilon = 1e-3);
        assert!(v.expected_net_return < 0.0);
        assert!(!v.recommended);
    }

    #[test]
    fn test_large_balance_actionable() {
        let v = value_customer(0.95, &account(500_000.0), &RetentionConfig::default()).unwrap();
        assert_relative_eq!(v.annual_profit, 10_130.0);
        assert_relative_eq!(v.lifetime_value, 10_663.157, epsilon = 1e-2);
        assert_relative_eq!(v.expected_net_return, 1526.0, epsilon = 1e-6);
        assert!(v.recommended);
    }

    #[rstest]
    #[case(0.0, MAX_LIFESPAN_YEARS)]
    #[case(0.05, MAX_LIFESPAN_YEARS)]
    #[case(0.1, 10.0)]
    #[case(0.25, 4.0)]
    #[case(1.0, 1.0)]
    fn test_expected_lifespan(#[case] probability: f64, #[case] expected: f64) {
        assert_relative_eq!(expected_lifespan(probability), expected);
    }

    #[test]
    fn test_card_profit_requires_active_member() {
        let mut a = account(0.0);
        assert_relative_eq!(a.annual_profit(), 130.0);
        a.is_active_member = false;
        assert_relative_eq!(a.annual_profit(), 100.0);
        a.is_active_member = true;
        a.has_credit_card = false;
        assert_relative_eq!(a.annual_profit(), 100.0);
    }

    #[rstest]
    #[case(RetentionConfig { retention_cost: -1.0, expected_success_rate: 0.2 })]
    #[case(RetentionConfig { retention_cost: f64::NAN, expected_success_rate: 0.2 })]
    #[case(RetentionConfig { retention_cost: 500.0, expected_success_rate: 1.5 })]
    #[case(RetentionConfig { retention_cost: 500.0, expected_success_rate: f64::NAN })]
    fn test_invalid_config(#[case] config: RetentionConfig) {
        assert!(matches!(config.validate(), Err(OutputError::InvalidConfig(_))));
        assert!(RetentionValueEngine::new(config).is_err());
    }

    #[test]
    fn test_zero_cost_config_is_valid() {
        let config = RetentionConfig {
            retention_cost: 0.0,
            expected_success_rate: 0.0,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_evaluate_sorts_and_filters() {
        let engine = RetentionValueEngine::new(RetentionConfig::default()).unwrap();
        let report = engine.evaluate(&[
            scored(1, 100_000.0, 0.5),
            scored(2, 500_000.0, 0.95),
            scored(3, 900_000.0, 0.6),
        ]);

        assert_eq!(report.evaluated, 3);
        assert!(report.errors.is_empty());
        let rows: Vec<usize> = report.candidates.iter().map(|c| c.customer.row).collect();
        assert_eq!(rows, vec![3, 2]);
        assert_eq!(report.summary.actionable_count, 2);
        assert_relative_eq!(report.summary.total_cost, 1000.0);
    }

    #[test]
    fn test_malformed_row_is_recorded() {
        let engine = RetentionValueEngine::new(RetentionConfig::default()).unwrap();
        let report = engine.evaluate(&[
            scored(1, 500_000.0, 0.95),
            scored(2, f64::NAN, 0.9),
            scored(3, 500_000.0, 1.2),
            scored(4, 600_000.0, 0.9),
        ]);

        assert_eq!(report.evaluated, 2);
        assert_eq!(report.candidates.len(), 2);
        let failed: Vec<usize> = report.errors.iter().map(|e| e.row).collect();
        assert_eq!(failed, vec![2, 3]);
    }

    #[test]
    fn test_length_mismatch() {
        let engine = RetentionValueEngine::new(RetentionConfig::default()).unwrap();
        let err = engine.evaluate_records(&[], &[0.5]).unwrap_err();
        assert!(matches!(
            err,
            OutputError::LengthMismatch {
                customers: 0,
                probabilities: 1
            }
        ));
    }
}
