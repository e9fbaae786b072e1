//! Client-side analysis logic.
//!
//! Everything here is pure: the anomaly scores, category averages and
//! aggregates come from the analysis backend, and this crate only derives
//! what the UI shows from them:
//!
//! - [`format_currency`]: rupee formatting with Indian digit grouping.
//! - [`explain`]: why a flagged transaction was flagged.
//! - [`filter`]: status and free-text filtering of the transaction list.

pub use explain::{
    ABOVE_AVERAGE_MULTIPLE, Explanation, LARGE_INCOME_THRESHOLD, Thresholds, Tone, explain,
    explain_optional,
};
pub use filter::{FilteredView, StatusFilter, filter, filter_indices};
pub use money::format_currency;

mod currency;
mod explain;
mod filter;
mod money;
