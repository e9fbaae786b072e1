//! Reconstructs a human-readable reason for a flagged transaction.
//!
//! The backend only says *that* a row is anomalous. The explanation is
//! rebuilt on the client from the sign and size of the amount and from the
//! category averages sent alongside the analysis.

use std::fmt;

use api_types::transaction::{CategoryAverages, Transaction};
use serde::Deserialize;

use crate::format_currency;

/// Income above this many rupees is explained as a rare large income.
pub const LARGE_INCOME_THRESHOLD: f64 = 50_000.0;

/// An expense above this multiple of its category average is explained as
/// above-average spending.
pub const ABOVE_AVERAGE_MULTIPLE: f64 = 1.5;

/// Decision thresholds, overridable from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub large_income: f64,
    pub above_average_multiple: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            large_income: LARGE_INCOME_THRESHOLD,
            above_average_multiple: ABOVE_AVERAGE_MULTIPLE,
        }
    }
}

/// How the explanation should be coloured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Warning,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Explanation {
    LargeIncome {
        amount: f64,
    },
    AboveAverageExpense {
        /// Absolute expense amount.
        amount: f64,
        /// `amount / average`, rounded to one decimal.
        multiple: f64,
        average: f64,
        category: String,
    },
    Generic,
}

impl Explanation {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::LargeIncome { .. } => "▲",
            Self::AboveAverageExpense { .. } => "▼",
            Self::Generic => "⚠",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::LargeIncome { .. } => Tone::Positive,
            Self::AboveAverageExpense { .. } => Tone::Negative,
            Self::Generic => Tone::Warning,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::LargeIncome { .. } => "Large income",
            Self::AboveAverageExpense { .. } => "Above-average expense",
            Self::Generic => "Unusual pattern",
        }
    }

    /// The sentence shown in the detail panel.
    pub fn message(&self) -> String {
        match self {
            Self::LargeIncome { .. } => "This is a large income transaction, which is \
                statistically rare compared to your regular expenses."
                .to_string(),
            Self::AboveAverageExpense {
                amount,
                multiple,
                average,
                category,
            } => format!(
                "This expense of {} is {multiple:.1} times higher than your average spend \
                 of {} for the '{category}' category.",
                format_currency(*amount),
                format_currency(*average),
            ),
            Self::Generic => "This transaction is flagged as a potential anomaly because its \
                spending pattern is statistically different from your other transactions."
                .to_string(),
        }
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Picks the explanation for one transaction. First matching rule wins:
///
/// 1. income larger than `thresholds.large_income`;
/// 2. expense whose ratio to a positive category average exceeds
///    `thresholds.above_average_multiple`;
/// 3. anything else, including a category without an average.
pub fn explain(
    transaction: &Transaction,
    averages: &CategoryAverages,
    thresholds: &Thresholds,
) -> Explanation {
    let amount = transaction.amount.abs();

    if transaction.is_income() && amount > thresholds.large_income {
        return Explanation::LargeIncome { amount };
    }

    if transaction.is_expense() {
        let average = averages
            .get(&transaction.category)
            .copied()
            .filter(|avg| avg.is_finite() && *avg > 0.0);

        if let Some(average) = average {
            // The unrounded ratio decides; rounding is for display only, so a
            // ratio of 1.51 qualifies and reads as "1.5 times".
            let ratio = amount / average;
            if ratio > thresholds.above_average_multiple {
                return Explanation::AboveAverageExpense {
                    amount,
                    multiple: round_one_decimal(ratio),
                    average,
                    category: transaction.category.clone(),
                };
            }
        }
    }

    Explanation::Generic
}

/// Like [`explain`], but yields nothing when either input is missing so the
/// caller can skip the explanation panel entirely.
pub fn explain_optional(
    transaction: Option<&Transaction>,
    averages: Option<&CategoryAverages>,
    thresholds: &Thresholds,
) -> Option<Explanation> {
    Some(explain(transaction?, averages?, thresholds))
}

/// Half-away-from-zero rounding, so `2.25` reads as `2.3`.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
