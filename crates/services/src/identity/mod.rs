//! Email/password sessions.
//!
//! Each provider keeps the current user in a [`SessionCell`]; interested
//! parties [`Identity::subscribe`] to be told when it changes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::error::AuthError;

mod firebase;
mod memory;

pub use firebase::{DEFAULT_IDENTITY_URL, DEFAULT_TOKEN_URL, FirebaseIdentity};
pub use memory::MemoryIdentity;

/// The signed-in user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct User {
    pub uid: String,
    pub email: String,
    /// Bearer token for the document store. Empty for in-memory sessions.
    pub id_token: String,
    /// Exchanged for a new `id_token` once it nears `expires_at`.
    pub refresh_token: String,
    /// `None` when the token never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl User {
    /// True once `now` is within `margin` of the token's expiry.
    pub fn token_expires_within(&self, now: DateTime<Utc>, margin: chrono::Duration) -> bool {
        self.expires_at.is_some_and(|at| at - margin <= now)
    }
}

#[async_trait]
pub trait Identity: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Ends the session. Signing out with no session is a no-op.
    async fn sign_out(&self);

    fn current_user(&self) -> Option<User>;

    /// The current user with a token that is still good to present. Providers
    /// with expiring tokens refresh it here without notifying subscribers;
    /// the session itself has not changed.
    async fn fresh_user(&self) -> Option<User> {
        self.current_user()
    }

    /// Receives the current user now and every change after.
    fn subscribe(&self) -> watch::Receiver<Option<User>>;
}

/// Shared holder of the current session.
#[derive(Debug)]
pub struct SessionCell {
    tx: watch::Sender<Option<User>>,
}

impl Default for SessionCell {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }
}

impl SessionCell {
    pub fn get(&self) -> Option<User> {
        self.tx.borrow().clone()
    }

    pub fn set(&self, user: Option<User>) {
        match &user {
            Some(u) => tracing::info!(uid = %u.uid, "session started"),
            None => tracing::info!("session ended"),
        }
        self.tx.send_replace(user);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.tx.subscribe()
    }

    /// Swaps in new tokens for the same user. Subscribers are not woken and
    /// a session that ended or changed hands in the meantime is left alone.
    pub fn refresh(&self, user: &User) -> bool {
        let mut replaced = false;
        self.tx.send_if_modified(|current| {
            if let Some(current) = current.as_mut().filter(|c| c.uid == user.uid) {
                current.clone_from(user);
                replaced = true;
            }
            false
        });
        replaced
    }
}
