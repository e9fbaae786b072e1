use crate::currency::Currency;

/// Signed money amount represented as **integer paise**.
///
/// The backend sends amounts as JSON floats; they are converted once, at
/// formatting time, so grouping and rounding never depend on float output.
///
/// The value is signed:
/// - positive = income
/// - negative = expense
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Money(i64);

impl Money {
    const ZERO: Money = Money(0);

    /// Converts a major-unit float, rounding to the nearest paisa.
    ///
    /// NaN and infinities become zero.
    pub(crate) fn from_major(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        Self((value * 100.0).round() as i64)
    }

    /// Formats with symbol, digit grouping and a fixed number of decimals.
    pub(crate) fn format(self, currency: Currency) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = 10u64.pow(u32::from(currency.minor_units()));
        let major = currency.group_digits(&(abs / scale).to_string());
        let fraction = abs % scale;
        let width = usize::from(currency.minor_units());
        format!(
            "{sign}{symbol}{major}.{fraction:0width$}",
            symbol = currency.symbol()
        )
    }
}

/// Formats a backend amount as rupees, e.g. `-3000.0` → `-₹3,000.00`.
///
/// ```rust
/// assert_eq!(engine::format_currency(100_000.5), "₹1,00,000.50");
/// ```
#[must_use]
pub fn format_currency(value: f64) -> String {
    Money::from_major(value).format(Currency::Inr)
}
