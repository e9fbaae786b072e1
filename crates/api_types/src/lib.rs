use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body attached by the backend to every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Tolerant field decoders.
///
/// The analysis backend serializes a dataframe, so scalar fields can show up
/// as numbers, strings or `null` depending on the uploaded CSV.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Strings, numbers and booleans become text, `null` becomes `""`.
    pub(crate) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        })
    }

    /// Anything that is not a finite number (or a numeric string) is `0.0`.
    pub(crate) fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(value.filter(|v| v.is_finite()).unwrap_or(0.0))
    }

    /// Accepts `true`/`false`, `0`/`1` and `null`.
    pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Value::String(s) => matches!(s.trim(), "1" | "true" | "True"),
            _ => false,
        })
    }

    pub(crate) fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|v| v.max(0.0) as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        Ok(value.unwrap_or(0))
    }
}

pub mod transaction {
    use super::*;

    /// Category name → mean absolute expense, computed by the backend.
    pub type CategoryAverages = BTreeMap<String, f64>;

    /// One row of an analyzed statement.
    ///
    /// The field names on the wire are the CSV column names. Identity is
    /// positional: the backend assigns no id.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct Transaction {
        #[serde(rename = "Date", default, deserialize_with = "lenient::string")]
        pub date: String,
        #[serde(rename = "Description", default, deserialize_with = "lenient::string")]
        pub description: String,
        /// Signed amount: negative is an expense, positive is income.
        #[serde(rename = "Amount", default, deserialize_with = "lenient::amount")]
        pub amount: f64,
        #[serde(rename = "Category", default, deserialize_with = "lenient::string")]
        pub category: String,
        #[serde(default, deserialize_with = "lenient::flag")]
        pub is_anomaly: bool,
    }

    impl Transaction {
        pub fn is_expense(&self) -> bool {
            self.amount < 0.0
        }

        pub fn is_income(&self) -> bool {
            self.amount > 0.0
        }
    }
}

pub mod analysis {
    use super::*;
    use crate::transaction::{CategoryAverages, Transaction};

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct Summary {
        #[serde(deserialize_with = "lenient::amount")]
        pub total_expenses: f64,
        #[serde(deserialize_with = "lenient::amount")]
        pub total_income: f64,
        #[serde(deserialize_with = "lenient::amount")]
        pub balance: f64,
        #[serde(deserialize_with = "lenient::count")]
        pub anomalies_found: u64,
        /// Not sent by every backend version.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub total_transactions: Option<u64>,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ChartsData {
        /// Month name → total spending.
        pub monthly_spending: BTreeMap<String, f64>,
        /// Category → total spending.
        pub category_spending: BTreeMap<String, f64>,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct Analysis {
        pub category_averages: CategoryAverages,
    }

    /// Full output of one CSV upload.
    ///
    /// `file_name` and `uploaded_at` are not produced by the analysis
    /// endpoint: the client fills the first, the document store the second.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct AnalysisResult {
        #[serde(default)]
        pub transactions: Vec<Transaction>,
        #[serde(default)]
        pub summary: Summary,
        #[serde(default)]
        pub charts_data: ChartsData,
        #[serde(default)]
        pub analysis: Analysis,
        #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
        pub file_name: Option<String>,
        #[serde(rename = "uploadedAt", default, skip_serializing_if = "Option::is_none")]
        pub uploaded_at: Option<DateTime<Utc>>,
    }

    impl AnalysisResult {
        /// Reported transaction total, falling back to the row count.
        pub fn transaction_count(&self) -> u64 {
            self.summary
                .total_transactions
                .unwrap_or(self.transactions.len() as u64)
        }

        pub fn category_averages(&self) -> &CategoryAverages {
            &self.analysis.category_averages
        }

        pub fn display_name(&self) -> &str {
            self.file_name.as_deref().unwrap_or("Uploaded File")
        }
    }
}

pub mod history {
    use crate::analysis::AnalysisResult;

    /// A stored analysis as read back from the user's collection.
    #[derive(Clone, Debug, PartialEq)]
    pub struct AnalysisRecord {
        /// Document id assigned at write time.
        pub id: String,
        pub result: AnalysisResult,
    }

    impl AnalysisRecord {
        pub fn title(&self) -> &str {
            self.result.file_name.as_deref().unwrap_or("Analysis")
        }
    }
}

pub mod news {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct ArticleSource {
        pub name: Option<String>,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct Article {
        #[serde(default, deserialize_with = "lenient::string")]
        pub title: String,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default, deserialize_with = "lenient::string")]
        pub url: String,
        #[serde(rename = "urlToImage", default)]
        pub url_to_image: Option<String>,
        #[serde(rename = "publishedAt", default)]
        pub published_at: Option<String>,
        #[serde(default)]
        pub source: Option<ArticleSource>,
    }
}

#[cfg(test)]
mod tests {
    use super::analysis::AnalysisResult;
    use super::transaction::Transaction;

    #[test]
    fn transaction_decodes_backend_record() {
        let json = r#"{"Date":"2024-01-05","Description":"Swiggy","Amount":-450.5,
            "Category":"Dining","is_anomaly":1,"month":"January"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.description, "Swiggy");
        assert_eq!(tx.amount, -450.5);
        assert!(tx.is_anomaly);
        assert!(tx.is_expense());
    }

    #[test]
    fn transaction_tolerates_missing_and_non_numeric_fields() {
        let json = r#"{"Amount":"abc","Description":null,"is_anomaly":0}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount, 0.0);
        assert_eq!(tx.description, "");
        assert_eq!(tx.category, "");
        assert!(!tx.is_anomaly);
    }

    #[test]
    fn numeric_string_amount_is_parsed() {
        let tx: Transaction = serde_json::from_str(r#"{"Amount":" 1200.25 "}"#).unwrap();
        assert_eq!(tx.amount, 1200.25);
    }

    #[test]
    fn analysis_result_without_client_fields() {
        let json = r#"{
            "transactions": [{"Date":"2024-01-01","Description":"Salary","Amount":60000,"Category":"Salary","is_anomaly":1}],
            "summary": {"anomalies_found": 1, "total_income": 60000.0, "total_expenses": 0.0, "balance": 60000.0},
            "charts_data": {"category_spending": {}, "monthly_spending": {}},
            "analysis": {"category_averages": {"Dining": 1000.0}}
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.transactions.len(), 1);
        assert_eq!(result.summary.anomalies_found, 1);
        assert_eq!(result.transaction_count(), 1);
        assert_eq!(result.category_averages().get("Dining"), Some(&1000.0));
        assert_eq!(result.file_name, None);
        assert_eq!(result.display_name(), "Uploaded File");
    }

    #[test]
    fn client_fields_use_camel_case() {
        let result = AnalysisResult {
            file_name: Some("march.csv".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["fileName"], "march.csv");
        assert!(value.get("uploadedAt").is_none());
    }
}
