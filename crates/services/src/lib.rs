//! Remote collaborators of the client: the analysis backend, the identity
//! provider and the document store, plus [`AnalysisSessionStore`] which
//! ties them together for one signed-in user.

pub mod api;
pub mod error;
pub mod identity;
pub mod session;
pub mod store;

pub use api::AnalysisApi;
pub use error::{
    AuthError, HistoryFetchError, NewsFetchError, PersistError, RemoteAnalysisError, StoreError,
};
pub use identity::{
    DEFAULT_IDENTITY_URL, DEFAULT_TOKEN_URL, FirebaseIdentity, Identity, MemoryIdentity, User,
};
pub use session::{AnalysisSessionStore, PersistEvent, UPLOADED_AT_FIELD};
pub use store::{
    CollectionPath, DEFAULT_FIRESTORE_URL, Direction, Document, DocumentStore, Firestore, MemoryStore,
};

pub const DEFAULT_ANALYSIS_URL: &str = "https://personal-finance-anomaly.onrender.com";
