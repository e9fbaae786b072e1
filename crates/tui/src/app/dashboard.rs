use std::path::PathBuf;

use api_types::{analysis::AnalysisResult, transaction::Transaction};
use engine::{Explanation, FilteredView, StatusFilter, Thresholds, explain_optional};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardFocus {
    #[default]
    Browse,
    Path,
    Search,
}

/// Upload prompt and results view.
///
/// `generation` changes whenever `result` is replaced, which is what keys
/// the memoized filter.
#[derive(Debug, Default)]
pub struct DashboardState {
    pub result: Option<AnalysisResult>,
    pub generation: u64,
    pub view: FilteredView,
    pub status: StatusFilter,
    pub search: String,
    pub path_input: String,
    pub focus: DashboardFocus,
    pub selected: usize,
    pub detail_open: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl DashboardState {
    /// Whether keystrokes go to a text field.
    pub fn editing(&self) -> bool {
        matches!(self.focus, DashboardFocus::Path | DashboardFocus::Search)
    }

    /// Replaces the displayed analysis, e.g. with one opened from history.
    pub fn show(&mut self, result: AnalysisResult) {
        self.result = Some(result);
        self.generation += 1;
        self.search.clear();
        self.status = StatusFilter::All;
        self.selected = 0;
        self.detail_open = false;
        self.focus = DashboardFocus::Browse;
        self.error = None;
        self.refresh_view();
    }

    pub fn clear(&mut self) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
    }

    /// Starts an upload of the typed path. Returns `None` while another
    /// upload is running or when no path was entered.
    pub fn begin_upload(&mut self) -> Option<PathBuf> {
        if self.loading {
            return None;
        }
        let path = self.path_input.trim();
        if path.is_empty() {
            return None;
        }
        let path = PathBuf::from(path);

        self.loading = true;
        self.error = None;
        self.result = None;
        self.generation += 1;
        self.search.clear();
        self.status = StatusFilter::All;
        self.selected = 0;
        self.detail_open = false;
        self.focus = DashboardFocus::Browse;
        self.refresh_view();
        Some(path)
    }

    pub fn finish_upload(&mut self, outcome: Result<AnalysisResult, String>) {
        self.loading = false;
        match outcome {
            Ok(result) => {
                self.path_input.clear();
                self.show(result);
            }
            Err(message) => {
                self.error = Some(format!("Error: {message}"));
                self.focus = DashboardFocus::Path;
            }
        }
    }

    pub fn transactions(&self) -> Option<&[Transaction]> {
        self.result.as_ref().map(|r| r.transactions.as_slice())
    }

    pub fn refresh_view(&mut self) {
        let transactions = self.result.as_ref().map(|r| r.transactions.as_slice());
        if self
            .view
            .refresh(self.generation, transactions, self.status, &self.search)
        {
            self.selected = self.selected.min(self.view.len().saturating_sub(1));
        }
        if self.view.is_empty() {
            self.detail_open = false;
        }
    }

    pub fn cycle_status(&mut self) {
        self.status = self.status.next();
        self.selected = 0;
        self.refresh_view();
    }

    pub fn push_search(&mut self, ch: char) {
        self.search.push(ch);
        self.selected = 0;
        self.refresh_view();
    }

    pub fn pop_search(&mut self) {
        self.search.pop();
        self.selected = 0;
        self.refresh_view();
    }

    pub fn select_next(&mut self) {
        if self.view.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.view.len() - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_transaction(&self) -> Option<&Transaction> {
        let index = self.view.source_index(self.selected)?;
        self.transactions()?.get(index)
    }

    pub fn toggle_detail(&mut self) {
        self.detail_open = !self.detail_open && self.selected_transaction().is_some();
    }

    /// Explanation for the selected row, only while the detail panel is open
    /// and only for a row the backend flagged.
    pub fn explanation(&self, thresholds: &Thresholds) -> Option<Explanation> {
        if !self.detail_open {
            return None;
        }
        explain_optional(
            self.selected_transaction().filter(|tx| tx.is_anomaly),
            self.result.as_ref().map(AnalysisResult::category_averages),
            thresholds,
        )
    }
}

#[cfg(test)]
mod tests {
    use api_types::analysis::Summary;

    use super::*;

    fn tx(description: &str, amount: f64, category: &str, is_anomaly: bool) -> Transaction {
        Transaction {
            date: "2024-03-01".to_string(),
            description: description.to_string(),
            amount,
            category: category.to_string(),
            is_anomaly,
        }
    }

    fn result() -> AnalysisResult {
        let mut result = AnalysisResult {
            transactions: vec![
                tx("Salary", 60_000.0, "Salary", true),
                tx("Groceries", -900.0, "Food", false),
                tx("Rooftop dinner", -3000.0, "Dining", true),
            ],
            summary: Summary {
                anomalies_found: 2,
                ..Summary::default()
            },
            ..AnalysisResult::default()
        };
        result
            .analysis
            .category_averages
            .insert("Dining".to_string(), 1000.0);
        result
    }

    #[test]
    fn upload_resets_search_and_filter() {
        let mut dash = DashboardState::default();
        dash.show(result());
        dash.cycle_status();
        dash.push_search('d');
        dash.path_input = " next.csv ".to_string();

        let path = dash.begin_upload().unwrap();
        assert_eq!(path, PathBuf::from("next.csv"));
        assert!(dash.loading);
        assert!(dash.result.is_none());
        assert_eq!(dash.status, StatusFilter::All);
        assert!(dash.search.is_empty());
        assert!(dash.view.is_empty());
    }

    #[test]
    fn trigger_is_disabled_while_loading() {
        let mut dash = DashboardState {
            path_input: "a.csv".to_string(),
            ..DashboardState::default()
        };
        assert!(dash.begin_upload().is_some());
        assert!(dash.begin_upload().is_none());

        dash.finish_upload(Ok(result()));
        assert!(!dash.loading);
        assert_eq!(dash.view.len(), 3);
        assert!(dash.path_input.is_empty());
    }

    #[test]
    fn empty_path_does_nothing() {
        let mut dash = DashboardState::default();
        dash.path_input = "   ".to_string();
        assert!(dash.begin_upload().is_none());
        assert!(!dash.loading);
    }

    #[test]
    fn failed_upload_shows_prefixed_message() {
        let mut dash = DashboardState {
            path_input: "a.csv".to_string(),
            ..DashboardState::default()
        };
        dash.begin_upload();
        dash.finish_upload(Err("Missing column: Amount".to_string()));
        assert_eq!(dash.error.as_deref(), Some("Error: Missing column: Amount"));
        assert!(dash.result.is_none());
        assert_eq!(dash.path_input, "a.csv");
    }

    #[test]
    fn selection_follows_the_filtered_view() {
        let mut dash = DashboardState::default();
        dash.show(result());
        dash.cycle_status();
        assert_eq!(dash.status, StatusFilter::Anomalies);
        dash.select_next();
        assert_eq!(
            dash.selected_transaction().map(|t| t.description.as_str()),
            Some("Rooftop dinner")
        );
        dash.select_next();
        assert_eq!(dash.selected, 1);
    }

    #[test]
    fn explanation_only_with_open_detail() {
        let mut dash = DashboardState::default();
        dash.show(result());
        dash.push_search('r');
        dash.push_search('o');
        dash.push_search('o');
        let thresholds = Thresholds::default();
        assert_eq!(dash.explanation(&thresholds), None);

        dash.toggle_detail();
        let explanation = dash.explanation(&thresholds).unwrap();
        assert!(matches!(explanation, Explanation::AboveAverageExpense { .. }));

        dash.toggle_detail();
        assert_eq!(dash.explanation(&thresholds), None);
    }

    #[test]
    fn normal_row_has_no_explanation() {
        let mut result = result();
        result
            .transactions
            .push(tx("Team lunch", -4000.0, "Dining", false));
        let mut dash = DashboardState::default();
        dash.show(result);
        dash.push_search('l');
        dash.push_search('u');
        dash.push_search('n');
        dash.toggle_detail();
        assert!(dash.detail_open);
        assert_eq!(
            dash.selected_transaction().map(|t| t.description.as_str()),
            Some("Team lunch")
        );
        assert_eq!(dash.explanation(&Thresholds::default()), None);
    }

    #[test]
    fn detail_closes_when_nothing_matches() {
        let mut dash = DashboardState::default();
        dash.show(result());
        dash.toggle_detail();
        assert!(dash.detail_open);
        dash.push_search('z');
        assert!(!dash.detail_open);
        assert_eq!(dash.selected_transaction(), None);
    }
}
