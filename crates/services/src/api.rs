use api_types::{ErrorBody, analysis::AnalysisResult, news::Article};
use reqwest::{
    Client, Response,
    multipart::{Form, Part},
};

use crate::error::{NewsFetchError, RemoteAnalysisError};

/// HTTP client for the analysis backend (`/process_csv` and `/news`).
#[derive(Clone, Debug)]
pub struct AnalysisApi {
    http: Client,
    base_url: String,
}

impl AnalysisApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Sends a statement as the multipart field `file` and decodes the
    /// analysis. `file_name` and `uploaded_at` are left unset.
    pub async fn process_csv(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<AnalysisResult, RemoteAnalysisError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        tracing::debug!(file_name, "uploading statement");
        let res = self
            .http
            .post(self.url("process_csv"))
            .multipart(form)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let message = error_message(res).await;
            tracing::warn!(%status, %message, "analysis request rejected");
            return Err(RemoteAnalysisError::Server { status, message });
        }

        let body = res.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn news(&self) -> Result<Vec<Article>, NewsFetchError> {
        let res = self.http.get(self.url("news")).send().await?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!(%status, "news request rejected");
            return Err(NewsFetchError::Server { status });
        }

        let body = res.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// The backend's `error` field, or a generic message when the body has none.
async fn error_message(res: Response) -> String {
    match res.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => "Server error".to_string(),
    }
}
