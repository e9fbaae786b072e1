mod common;

use std::{io::Write, sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{Json, Router, routing::post};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use services::{
    AnalysisApi, AnalysisSessionStore, CollectionPath, Direction, Document, DocumentStore,
    HistoryFetchError, Identity, MemoryIdentity, MemoryStore, PersistEvent, StoreError, User,
};
use tokio::sync::mpsc::UnboundedReceiver;

struct Harness {
    session: AnalysisSessionStore,
    events: UnboundedReceiver<PersistEvent>,
    identity: Arc<MemoryIdentity>,
    store: Arc<MemoryStore>,
}

/// A store that refuses every write, like Firestore with a revoked token.
struct RejectingStore;

#[async_trait]
impl DocumentStore for RejectingStore {
    async fn add(
        &self,
        _user: &User,
        _collection: &CollectionPath,
        _fields: Map<String, Value>,
        _server_timestamp_field: &str,
    ) -> Result<String, StoreError> {
        Err(StoreError::Server {
            status: StatusCode::UNAUTHORIZED,
            message: "Missing or invalid authentication.".to_string(),
        })
    }

    async fn query_ordered(
        &self,
        _user: &User,
        _collection: &CollectionPath,
        _order_by: &str,
        _direction: Direction,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(Vec::new())
    }
}

async fn analysis_url() -> String {
    let app = Router::new().route(
        "/process_csv",
        post(|| async { Json(common::analysis_body()) }),
    );
    common::serve(app).await
}

async fn harness() -> Harness {
    let url = analysis_url().await;

    let identity = Arc::new(MemoryIdentity::new());
    let store = Arc::new(MemoryStore::new());
    let (session, events) =
        AnalysisSessionStore::new(AnalysisApi::new(&url), identity.clone(), store.clone());
    Harness {
        session,
        events,
        identity,
        store,
    }
}

fn statement(name: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "Date,Description,Amount").unwrap();
    writeln!(file, "2024-03-01,Salary,60000").unwrap();
    (dir, path)
}

async fn next_event(events: &mut UnboundedReceiver<PersistEvent>) -> PersistEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn upload_file_names_the_result() {
    let h = harness().await;
    let (_dir, path) = statement("march.csv");

    let result = h.session.upload_file(&path).await.unwrap();
    assert_eq!(result.file_name.as_deref(), Some("march.csv"));
    assert_eq!(result.transactions.len(), 3);
}

#[tokio::test]
async fn missing_file_is_a_read_error() {
    let h = harness().await;
    let err = h
        .session
        .upload_file(std::path::Path::new("/definitely/not/here.csv"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.csv"));
}

#[tokio::test]
async fn signed_in_upload_is_saved_and_listed() {
    let mut h = harness().await;
    h.identity.sign_up("a@example.com", "secret1").await.unwrap();
    let (_dir, path) = statement("march.csv");

    h.session.analyze_file(&path).await.unwrap();
    let PersistEvent::Saved { id, file_name } = next_event(&mut h.events).await else {
        panic!("expected the analysis to be saved");
    };
    assert_eq!(file_name, "march.csv");

    let history = h.session.list_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, id);
    assert_eq!(history[0].title(), "march.csv");
    assert!(history[0].result.uploaded_at.is_some());
    assert!(history[0].result.transactions[0].is_anomaly);
    assert_eq!(history[0].result.summary.anomalies_found, 2);
}

#[tokio::test]
async fn history_is_newest_first() {
    let mut h = harness().await;
    h.identity.sign_up("a@example.com", "secret1").await.unwrap();

    for name in ["jan.csv", "feb.csv", "mar.csv"] {
        let (_dir, path) = statement(name);
        h.session.analyze_file(&path).await.unwrap();
        assert!(matches!(
            next_event(&mut h.events).await,
            PersistEvent::Saved { .. }
        ));
    }

    let titles: Vec<String> = h
        .session
        .list_history()
        .await
        .unwrap()
        .iter()
        .map(|r| r.title().to_string())
        .collect();
    assert_eq!(titles, ["mar.csv", "feb.csv", "jan.csv"]);
}

#[tokio::test]
async fn anonymous_upload_is_not_saved() {
    let mut h = harness().await;
    let (_dir, path) = statement("march.csv");

    let result = h.session.analyze_file(&path).await.unwrap();
    assert_eq!(result.summary.anomalies_found, 2);
    assert_eq!(
        next_event(&mut h.events).await,
        PersistEvent::Skipped {
            file_name: "march.csv".to_string()
        }
    );
    assert_eq!(
        h.session.persist(&result, "march.csv").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn failed_save_still_returns_the_analysis() {
    let url = analysis_url().await;
    let identity = Arc::new(MemoryIdentity::new());
    identity.sign_up("a@example.com", "secret1").await.unwrap();
    let (session, mut events) =
        AnalysisSessionStore::new(AnalysisApi::new(&url), identity, Arc::new(RejectingStore));
    let (_dir, path) = statement("march.csv");

    let result = session.analyze_file(&path).await.unwrap();
    assert_eq!(result.summary.anomalies_found, 2);
    assert_eq!(result.file_name.as_deref(), Some("march.csv"));

    let PersistEvent::Failed { file_name, error } = next_event(&mut events).await else {
        panic!("expected the save to fail");
    };
    assert_eq!(file_name, "march.csv");
    assert!(error.contains("Missing or invalid authentication."));
}

#[tokio::test]
async fn history_requires_a_session() {
    let h = harness().await;
    let err = h.session.list_history().await.unwrap_err();
    assert!(matches!(err, HistoryFetchError::NoSession));
    assert_eq!(err.to_string(), "Failed to fetch analysis history.");
}

#[tokio::test]
async fn undecodable_documents_are_skipped() {
    let h = harness().await;
    let user = h.identity.sign_up("a@example.com", "secret1").await.unwrap();

    let mut fields = Map::new();
    fields.insert("uploadedAt".to_string(), "not a timestamp".into());
    h.store.insert(
        &CollectionPath::user_analyses(&user.uid),
        Document {
            id: "broken".to_string(),
            fields,
        },
    );

    assert!(h.session.list_history().await.unwrap().is_empty());
}
