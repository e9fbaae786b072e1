//! Upload, save and history for the signed-in user.

use std::{path::Path, sync::Arc};

use api_types::{analysis::AnalysisResult, history::AnalysisRecord, news::Article};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    api::AnalysisApi,
    error::{HistoryFetchError, NewsFetchError, PersistError, RemoteAnalysisError},
    identity::Identity,
    store::{CollectionPath, Direction, DocumentStore},
};

/// Field the store stamps with its own write time.
pub const UPLOADED_AT_FIELD: &str = "uploadedAt";

/// Outcome of a background save, for the diagnostics log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistEvent {
    Saved { id: String, file_name: String },
    Skipped { file_name: String },
    Failed { file_name: String, error: String },
}

#[derive(Clone)]
pub struct AnalysisSessionStore {
    api: AnalysisApi,
    identity: Arc<dyn Identity>,
    store: Arc<dyn DocumentStore>,
    events: mpsc::UnboundedSender<PersistEvent>,
}

impl AnalysisSessionStore {
    /// Also returns the receiving end of the persistence event channel.
    pub fn new(
        api: AnalysisApi,
        identity: Arc<dyn Identity>,
        store: Arc<dyn DocumentStore>,
    ) -> (Self, mpsc::UnboundedReceiver<PersistEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                api,
                identity,
                store,
                events,
            },
            rx,
        )
    }

    pub fn identity(&self) -> &Arc<dyn Identity> {
        &self.identity
    }

    /// Sends a statement for analysis. The result carries `file_name`.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<AnalysisResult, RemoteAnalysisError> {
        let mut result = self.api.process_csv(bytes, file_name).await?;
        result.file_name = Some(file_name.to_string());
        tracing::info!(
            file_name,
            transactions = result.transactions.len(),
            anomalies = result.summary.anomalies_found,
            "statement analyzed"
        );
        Ok(result)
    }

    pub async fn upload_file(&self, path: &Path) -> Result<AnalysisResult, RemoteAnalysisError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| RemoteAnalysisError::Read {
                path: path.display().to_string(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.upload(bytes, &file_name).await
    }

    /// Uploads a file, then saves the result in the background.
    pub async fn analyze_file(&self, path: &Path) -> Result<AnalysisResult, RemoteAnalysisError> {
        let result = self.upload_file(path).await?;
        let file_name = result.display_name().to_string();
        self.persist_detached(result.clone(), file_name);
        Ok(result)
    }

    /// Saves under the current user's analyses. Returns the new document id,
    /// or `None` when nobody is signed in.
    pub async fn persist(
        &self,
        result: &AnalysisResult,
        file_name: &str,
    ) -> Result<Option<String>, PersistError> {
        let Some(user) = self.identity.fresh_user().await else {
            return Ok(None);
        };

        let mut record = result.clone();
        record.file_name = Some(file_name.to_string());
        record.uploaded_at = None;
        let Value::Object(fields) = serde_json::to_value(&record)? else {
            return Ok(None);
        };

        let collection = CollectionPath::user_analyses(&user.uid);
        let id = self
            .store
            .add(&user, &collection, fields, UPLOADED_AT_FIELD)
            .await?;
        Ok(Some(id))
    }

    /// Runs [`Self::persist`] on a spawned task. The outcome is logged and
    /// reported on the event channel, never returned.
    pub fn persist_detached(&self, result: AnalysisResult, file_name: String) {
        let this = self.clone();
        tokio::spawn(async move {
            let event = match this.persist(&result, &file_name).await {
                Ok(Some(id)) => {
                    tracing::info!(%id, %file_name, "analysis saved");
                    PersistEvent::Saved { id, file_name }
                }
                Ok(None) => {
                    tracing::info!(%file_name, "no session, analysis not saved");
                    PersistEvent::Skipped { file_name }
                }
                Err(err) => {
                    tracing::warn!(%file_name, error = %err, "failed to save analysis");
                    PersistEvent::Failed {
                        file_name,
                        error: err.to_string(),
                    }
                }
            };
            let _ = this.events.send(event);
        });
    }

    /// The user's saved analyses, newest first. Documents that no longer
    /// decode are skipped.
    pub async fn list_history(&self) -> Result<Vec<AnalysisRecord>, HistoryFetchError> {
        let user = self
            .identity
            .fresh_user()
            .await
            .ok_or(HistoryFetchError::NoSession)?;

        let collection = CollectionPath::user_analyses(&user.uid);
        let docs = self
            .store
            .query_ordered(&user, &collection, UPLOADED_AT_FIELD, Direction::Descending)
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "history query failed"))?;

        let records = docs
            .into_iter()
            .filter_map(|doc| {
                match serde_json::from_value::<AnalysisResult>(Value::Object(doc.fields)) {
                    Ok(result) => Some(AnalysisRecord { id: doc.id, result }),
                    Err(err) => {
                        tracing::warn!(id = %doc.id, error = %err, "skipping undecodable analysis");
                        None
                    }
                }
            })
            .collect();
        Ok(records)
    }

    pub async fn news(&self) -> Result<Vec<Article>, NewsFetchError> {
        self.api.news().await
    }
}
