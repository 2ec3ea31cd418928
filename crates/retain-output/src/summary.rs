//! Retention campaign summary.
//!
//! Totals over the actionable customers of a valuation run, echoing the
//! campaign parameters they were computed with.

use crate::retention::{RetentionCandidate, RetentionConfig};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Campaign totals over the actionable customers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RetentionSummary {
    /// Customers worth an offer
    pub actionable_count: usize,

    /// Sum of expected net returns
    pub total_expected_return: f64,

    /// Offers times cost per offer
    pub total_cost: f64,

    /// Expected return before costs
    pub total_gross_return: f64,

    /// Cost of one offer
    pub cost_per_customer: f64,

    /// Expected success rate of an offer
    pub success_rate: f64,
}

impl RetentionSummary {
    /// Summarize a candidate list.
    ///
    /// # Examples
    ///
    /// ```
    /// use retain_output::{RetentionConfig, RetentionSummary};
    ///
    /// let summary = RetentionSummary::from_candidates(&[], &RetentionConfig::default());
    /// assert_eq!(summary.actionable_count, 0);
    /// assert_eq!(summary.average_expected_return(), 0.0);
    /// ```
    pub fn from_candidates(candidates: &[RetentionCandidate], config: &RetentionConfig) -> Self {
        let actionable_count = candidates.len();
        let total_expected_return: f64 = candidates.iter().map(|c| c.expected_net_return).sum();
        let total_cost = actionable_count as f64 * config.retention_cost;

        Self {
            actionable_count,
            total_expected_return,
            total_cost,
            total_gross_return: total_expected_return + total_cost,
            cost_per_customer: config.retention_cost,
            success_rate: config.expected_success_rate,
        }
    }

    /// Mean expected net return per actionable customer.
    pub fn average_expected_return(&self) -> f64 {
        if self.actionable_count == 0 {
            return 0.0;
        }
        self.total_expected_return / self.actionable_count as f64
    }

    /// Return on campaign cost, `None` when nothing is spent.
    pub fn return_on_cost(&self) -> Option<f64> {
        (self.total_cost > 0.0).then(|| self.total_expected_return / self.total_cost)
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str("\nRetention Campaign Summary\n");
        output.push_str(&"=".repeat(50));
        output.push('\n');

        let rows = [
            ("Actionable customers", self.actionable_count.to_string()),
            ("Cost per customer", format!("{:.2}", self.cost_per_customer)),
            ("Success rate", format!("{:.1}%", self.success_rate * 100.0)),
            ("Total cost", format!("{:.2}", self.total_cost)),
            ("Gross return", format!("{:.2}", self.total_gross_return)),
            ("Net expected return", format!("{:.2}", self.total_expected_return)),
            ("Average net return", format!("{:.2}", self.average_expected_return())),
        ];
        for (label, value) in rows {
            output.push_str(&format!("{:<28} {:>21}\n", label, value));
        }

        output.push_str(&"=".repeat(50));
        output.push('\n');
        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("## Retention Campaign Summary\n\n");
        output.push_str("| Metric | Value |\n");
        output.push_str("|--------|-------|\n");
        output.push_str(&format!(
            "| Actionable customers | {} |\n",
            self.actionable_count
        ));
        output.push_str(&format!(
            "| Cost per customer | {:.2} |\n",
            self.cost_per_customer
        ));
        output.push_str(&format!(
            "| Success rate | {:.1}% |\n",
            self.success_rate * 100.0
        ));
        output.push_str(&format!("| Total cost | {:.2} |\n", self.total_cost));
        output.push_str(&format!(
            "| Gross return | {:.2} |\n",
            self.total_gross_return
        ));
        output.push_str(&format!(
            "| Net expected return | {:.2} |\n",
            self.total_expected_return
        ));

        output
    }
}

impl fmt::Display for RetentionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} actionable customers, net expected return {:.2} on cost {:.2}",
            self.actionable_count, self.total_expected_return, self.total_cost
        )
    }
}
