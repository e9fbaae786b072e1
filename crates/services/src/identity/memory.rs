use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use super::{Identity, SessionCell, User};
use crate::error::AuthError;

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    uid: String,
    password: String,
}

/// Process-local accounts, for offline use and tests.
#[derive(Default)]
pub struct MemoryIdentity {
    accounts: Mutex<HashMap<String, Account>>,
    session: SessionCell,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Identity for MemoryIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = {
            let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
            let account = accounts
                .get(email)
                .filter(|a| a.password == password)
                .ok_or(AuthError::InvalidCredentials)?;
            User {
                uid: account.uid.clone(),
                email: email.to_string(),
                ..User::default()
            }
        };
        self.session.set(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if !email.contains('@') || password.chars().count() < MIN_PASSWORD_LEN {
            tracing::warn!(email, "rejected sign-up");
            return Err(AuthError::SignUpFailed);
        }

        let user = {
            let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
            if accounts.contains_key(email) {
                tracing::warn!(email, "account already exists");
                return Err(AuthError::SignUpFailed);
            }
            let uid = Uuid::new_v4().simple().to_string();
            accounts.insert(
                email.to_string(),
                Account {
                    uid: uid.clone(),
                    password: password.to_string(),
                },
            );
            User {
                uid,
                email: email.to_string(),
                ..User::default()
            }
        };
        self.session.set(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) {
        if self.session.get().is_some() {
            self.session.set(None);
        }
    }

    fn current_user(&self) -> Option<User> {
        self.session.get()
    }

    fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.session.subscribe()
    }
}
