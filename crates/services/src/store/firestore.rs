use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::{CollectionPath, Direction, Document, DocumentStore, codec};
use crate::{error::StoreError, identity::User};

pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct WireDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct QueryRow {
    document: Option<WireDocument>,
}

/// Cloud Firestore over its REST surface, authenticated with the signed-in
/// user's id token.
pub struct Firestore {
    http: Client,
    base_url: String,
    project_id: String,
}

impl Firestore {
    pub fn new(http: Client, base_url: &str, project_id: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
        }
    }

    /// `projects/{p}/databases/(default)/documents`
    fn database_root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder, user: &User) -> RequestBuilder {
        if user.id_token.is_empty() {
            request
        } else {
            request.bearer_auth(&user.id_token)
        }
    }
}

#[async_trait]
impl DocumentStore for Firestore {
    async fn add(
        &self,
        user: &User,
        collection: &CollectionPath,
        fields: Map<String, Value>,
        server_timestamp_field: &str,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let name = format!("{}/{}/{}", self.database_root(), collection, id);
        let body = json!({
            "writes": [{
                "update": {
                    "name": name,
                    "fields": codec::encode_fields(&fields),
                },
                "updateTransforms": [{
                    "fieldPath": server_timestamp_field,
                    "setToServerValue": "REQUEST_TIME",
                }],
                "currentDocument": { "exists": false },
            }]
        });

        tracing::debug!(%collection, %id, "committing document");
        let url = self.url(&format!("{}:commit", self.database_root()));
        let res = self
            .authorized(self.http.post(url), user)
            .json(&body)
            .send()
            .await?;
        check(res).await?;
        Ok(id)
    }

    async fn query_ordered(
        &self,
        user: &User,
        collection: &CollectionPath,
        order_by: &str,
        direction: Direction,
    ) -> Result<Vec<Document>, StoreError> {
        let parent = if collection.parent().is_empty() {
            self.database_root()
        } else {
            format!("{}/{}", self.database_root(), collection.parent())
        };
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection.collection_id() }],
                "orderBy": [{
                    "field": { "fieldPath": order_by },
                    "direction": direction.as_str(),
                }],
            }
        });

        tracing::debug!(%collection, order_by, "running query");
        let url = self.url(&format!("{parent}:runQuery"));
        let res = self
            .authorized(self.http.post(url), user)
            .json(&body)
            .send()
            .await?;
        let res = check(res).await?;

        let bytes = res.bytes().await?;
        let rows: Vec<QueryRow> =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Malformed(e.to_string()))?;

        rows.into_iter()
            .filter_map(|row| row.document)
            .map(|doc| {
                let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
                let fields = codec::decode_fields(&doc.fields)?;
                Ok(Document { id, fields })
            })
            .collect()
    }
}

async fn check(res: Response) -> Result<Response, StoreError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let message = match res.json::<ErrorEnvelope>().await {
        Ok(envelope) => envelope.error.message,
        Err(_) => String::new(),
    };
    Err(StoreError::Server { status, message })
}
