use reqwest::StatusCode;
use thiserror::Error;

/// Sign-in or sign-up failure.
///
/// The provider's reason is logged, never shown: the UI only ever displays
/// these two fixed messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Failed to create account. Please try again.")]
    SignUpFailed,
}

/// Failure of the analysis endpoint. The message is shown verbatim.
#[derive(Debug, Error)]
pub enum RemoteAnalysisError {
    #[error("{message}")]
    Server { status: StatusCode, message: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed analysis response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum NewsFetchError {
    #[error("Failed to fetch news from the server.")]
    Server { status: StatusCode },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed news response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failure talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Failure of the best-effort save that follows an upload.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("could not encode analysis: {0}")]
    Encode(#[from] serde_json::Error),
}

/// History could not be loaded. Both cases show the same text.
#[derive(Debug, Error)]
pub enum HistoryFetchError {
    #[error("Failed to fetch analysis history.")]
    NoSession,
    #[error("Failed to fetch analysis history.")]
    Query(#[source] StoreError),
}

impl From<StoreError> for HistoryFetchError {
    fn from(value: StoreError) -> Self {
        Self::Query(value)
    }
}
