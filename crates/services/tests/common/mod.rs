#![allow(dead_code)]

use axum::Router;
use serde_json::{Value, json};

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A backend response in its wire shape: capitalized transaction keys and
/// integer anomaly flags.
pub fn analysis_body() -> Value {
    json!({
        "transactions": [
            { "Date": "2024-03-01", "Description": "Salary", "Amount": 60000.0,
              "Category": "Salary", "is_anomaly": 1 },
            { "Date": "2024-03-02", "Description": "Rooftop dinner", "Amount": -3000.0,
              "Category": "Dining", "is_anomaly": 1 },
            { "Date": "2024-03-03", "Description": "Zomato", "Amount": -400.0,
              "Category": "Dining", "is_anomaly": 0 }
        ],
        "summary": {
            "total_expenses": 3400.0,
            "total_income": 60000.0,
            "balance": 56600.0,
            "anomalies_found": 2,
            "total_transactions": 3
        },
        "charts_data": {
            "monthly_spending": { "2024-03": 3400.0 },
            "category_spending": { "Dining": 3400.0 }
        },
        "analysis": { "category_averages": { "Dining": 1000.0 } }
    })
}
