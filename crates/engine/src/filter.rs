//! Status and free-text filtering of an analyzed transaction list.
//!
//! Filtering never reorders: the output keeps the order of the input.

use api_types::transaction::Transaction;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    All,
    Anomalies,
    Normal,
}

impl StatusFilter {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Anomalies => "Anomalies",
            Self::Normal => "Normal",
        }
    }

    /// All → Anomalies → Normal → All.
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Anomalies,
            Self::Anomalies => Self::Normal,
            Self::Normal => Self::All,
        }
    }

    pub fn matches(self, transaction: &Transaction) -> bool {
        match self {
            Self::All => true,
            Self::Anomalies => transaction.is_anomaly,
            Self::Normal => !transaction.is_anomaly,
        }
    }
}

/// Lowercased, trimmed needle; `None` means "match everything".
fn normalize_search(search: &str) -> Option<String> {
    let needle = search.trim().to_lowercase();
    (!needle.is_empty()).then_some(needle)
}

/// The amount as search text. Zero reads as a missing amount and gives no
/// text to match.
fn amount_text(amount: f64) -> String {
    if amount == 0.0 || amount.is_nan() {
        String::new()
    } else {
        amount.to_string()
    }
}

/// Substring match on description, category or the amount's string form.
fn matches_search(transaction: &Transaction, needle: &str) -> bool {
    transaction.description.to_lowercase().contains(needle)
        || transaction.category.to_lowercase().contains(needle)
        || amount_text(transaction.amount).contains(needle)
}

/// Positions of the transactions passing both stages, in input order.
///
/// An absent list yields an empty result.
pub fn filter_indices(
    transactions: Option<&[Transaction]>,
    status: StatusFilter,
    search: &str,
) -> Vec<usize> {
    let Some(transactions) = transactions else {
        return Vec::new();
    };
    let needle = normalize_search(search);

    transactions
        .iter()
        .enumerate()
        .filter(|(_, tx)| status.matches(tx))
        .filter(|(_, tx)| needle.as_deref().is_none_or(|n| matches_search(tx, n)))
        .map(|(index, _)| index)
        .collect()
}

/// The transactions to render for a status filter and search term.
pub fn filter<'a>(
    transactions: Option<&'a [Transaction]>,
    status: StatusFilter,
    search: &str,
) -> Vec<&'a Transaction> {
    let Some(all) = transactions else {
        return Vec::new();
    };
    filter_indices(Some(all), status, search)
        .into_iter()
        .map(|index| &all[index])
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewKey {
    generation: u64,
    status: StatusFilter,
    search: String,
}

/// Memoized filter output.
///
/// The owner bumps `generation` whenever the transaction list is replaced;
/// the filter only runs again when the generation, status or search change.
#[derive(Debug, Default)]
pub struct FilteredView {
    key: Option<ViewKey>,
    indices: Vec<usize>,
}

impl FilteredView {
    /// Recomputes if any input changed. Returns `true` when it did.
    pub fn refresh(
        &mut self,
        generation: u64,
        transactions: Option<&[Transaction]>,
        status: StatusFilter,
        search: &str,
    ) -> bool {
        let unchanged = self.key.as_ref().is_some_and(|key| {
            key.generation == generation && key.status == status && key.search == search
        });
        if unchanged {
            return false;
        }

        self.indices = filter_indices(transactions, status, search);
        self.key = Some(ViewKey {
            generation,
            status,
            search: search.to_string(),
        });
        true
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Index into the source list of the `row`-th visible transaction.
    pub fn source_index(&self, row: usize) -> Option<usize> {
        self.indices.get(row).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(description: &str, amount: f64, category: &str, is_anomaly: bool) -> Transaction {
        Transaction {
            date: "2024-01-01".to_string(),
            description: description.to_string(),
            amount,
            category: category.to_string(),
            is_anomaly,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("Big Bazaar grocery run", -2400.0, "Groceries", false),
            tx("Salary March", 60000.0, "Salary", true),
            tx("Zomato", -350.5, "Dining", false),
            tx("Rooftop dinner", -9800.0, "Dining", true),
            tx("Electricity bill", -1800.0, "Utilities", false),
            tx("Metro card", -500.0, "Transport", false),
            tx("GROCERY top-up", -800.0, "Groceries", false),
            tx("Flight to Goa", -23000.0, "Travel", true),
            tx("Netflix", -649.0, "Entertainment", false),
            tx("Pharmacy", -420.0, "Health", false),
        ]
    }

    fn owned(items: Vec<&Transaction>) -> Vec<Transaction> {
        items.into_iter().cloned().collect()
    }

    #[test]
    fn anomalies_keeps_flagged_rows_in_order() {
        let ts = sample();
        let result = filter(Some(ts.as_slice()), StatusFilter::Anomalies, "");
        let names: Vec<_> = result.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, ["Salary March", "Rooftop dinner", "Flight to Goa"]);
    }

    #[test]
    fn normal_and_anomalies_partition_the_list() {
        let ts = sample();
        let mut indices = filter_indices(Some(ts.as_slice()), StatusFilter::Normal, "");
        indices.extend(filter_indices(Some(ts.as_slice()), StatusFilter::Anomalies, ""));
        indices.sort_unstable();
        assert_eq!(indices, (0..ts.len()).collect::<Vec<_>>());
    }

    #[test]
    fn all_with_empty_search_returns_everything() {
        let ts = sample();
        assert_eq!(filter(Some(ts.as_slice()), StatusFilter::All, "   ").len(), ts.len());
    }

    #[test]
    fn search_is_case_insensitive() {
        let ts = sample();
        let upper = filter(Some(ts.as_slice()), StatusFilter::All, "GROCERY");
        let lower = filter(Some(ts.as_slice()), StatusFilter::All, "grocery");
        assert_eq!(upper, lower);
        assert_eq!(upper.len(), 2);
    }

    #[test]
    fn search_matches_category_and_amount() {
        let ts = sample();
        let dining = filter(Some(ts.as_slice()), StatusFilter::All, "dining");
        assert_eq!(dining.len(), 2);

        let by_amount = filter(Some(ts.as_slice()), StatusFilter::All, "350.5");
        assert_eq!(by_amount.len(), 1);
        assert_eq!(by_amount[0].description, "Zomato");

        let negative = filter(Some(ts.as_slice()), StatusFilter::All, "-98");
        assert_eq!(negative.len(), 1);
    }

    #[test]
    fn status_and_search_combine() {
        let ts = sample();
        let result = filter(Some(ts.as_slice()), StatusFilter::Anomalies, "din");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].description, "Rooftop dinner");
    }

    #[test]
    fn filtering_is_idempotent() {
        let ts = sample();
        for status in [StatusFilter::All, StatusFilter::Anomalies, StatusFilter::Normal] {
            for search in ["", "o", "dining", "00"] {
                let once = owned(filter(Some(ts.as_slice()), status, search));
                let twice = owned(filter(Some(once.as_slice()), status, search));
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn empty_and_absent_lists_yield_nothing() {
        assert!(filter(Some(&[][..]), StatusFilter::All, "x").is_empty());
        assert!(filter(None, StatusFilter::Anomalies, "").is_empty());
    }

    #[test]
    fn missing_text_fields_match_as_empty() {
        let ts = vec![Transaction {
            amount: -10.0,
            ..Default::default()
        }];
        assert!(filter(Some(ts.as_slice()), StatusFilter::All, "food").is_empty());
        assert_eq!(filter(Some(ts.as_slice()), StatusFilter::All, "10").len(), 1);
    }

    #[test]
    fn zero_amount_has_no_search_text() {
        let ts = vec![
            tx("Refund reversal", 0.0, "Other", false),
            tx("Metro card", -100.0, "Transport", false),
        ];
        let hits = owned(filter(Some(ts.as_slice()), StatusFilter::All, "0"));
        assert_eq!(hits, vec![ts[1].clone()]);
        assert_eq!(filter(Some(ts.as_slice()), StatusFilter::All, "refund").len(), 1);
    }

    #[test]
    fn status_cycles() {
        assert_eq!(StatusFilter::All.next(), StatusFilter::Anomalies);
        assert_eq!(StatusFilter::Anomalies.next(), StatusFilter::Normal);
        assert_eq!(StatusFilter::Normal.next(), StatusFilter::All);
    }

    #[test]
    fn view_recomputes_only_on_input_change() {
        let ts = sample();
        let mut view = FilteredView::default();
        assert!(view.refresh(1, Some(ts.as_slice()), StatusFilter::Anomalies, ""));
        assert_eq!(view.indices(), &[1, 3, 7]);
        assert!(!view.refresh(1, Some(ts.as_slice()), StatusFilter::Anomalies, ""));

        assert!(view.refresh(1, Some(ts.as_slice()), StatusFilter::Anomalies, "goa"));
        assert_eq!(view.indices(), &[7]);
        assert_eq!(view.source_index(0), Some(7));
        assert_eq!(view.source_index(1), None);

        assert!(view.refresh(2, Some(&ts[..2]), StatusFilter::Anomalies, "goa"));
        assert!(view.is_empty());
    }
}
