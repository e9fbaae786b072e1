use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::{Identity, SessionCell, User};
use crate::error::AuthError;

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Tokens this close to expiry, in seconds, are refreshed before use.
const REFRESH_MARGIN_SECS: i64 = 300;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

/// Secure Token reply; snake_case unlike the Identity Toolkit.
#[derive(Deserialize)]
struct TokenResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

/// `expiresIn` is a count of seconds sent as a string.
fn expiry(now: DateTime<Utc>, expires_in: Option<&str>) -> Option<DateTime<Utc>> {
    let secs = expires_in?.trim().parse::<i64>().ok()?;
    now.checked_add_signed(Duration::try_seconds(secs)?)
}

/// Identity Toolkit REST client (`accounts:signInWithPassword`,
/// `accounts:signUp`), with id tokens renewed through the Secure Token
/// service.
pub struct FirebaseIdentity {
    http: Client,
    base_url: String,
    token_url: String,
    api_key: String,
    session: SessionCell,
}

impl FirebaseIdentity {
    pub fn new(http: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_key: api_key.to_string(),
            session: SessionCell::default(),
        }
    }

    pub fn with_token_url(mut self, token_url: &str) -> Self {
        self.token_url = token_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, method: &str) -> String {
        format!("{}/accounts:{method}?key={}", self.base_url, self.api_key)
    }

    async fn exchange(&self, method: &str, email: &str, password: &str) -> Option<User> {
        let body = Credentials {
            email,
            password,
            return_secure_token: true,
        };
        let res = match self.http.post(self.url(method)).json(&body).send().await {
            Ok(res) => res,
            Err(err) => {
                tracing::warn!(method, error = %err, "identity request failed");
                return None;
            }
        };

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            tracing::warn!(method, %status, %detail, "identity provider rejected request");
            return None;
        }

        match res.json::<AuthResponse>().await {
            Ok(auth) => Some(User {
                uid: auth.local_id,
                email: if auth.email.is_empty() {
                    email.to_string()
                } else {
                    auth.email
                },
                id_token: auth.id_token,
                refresh_token: auth.refresh_token,
                expires_at: expiry(Utc::now(), auth.expires_in.as_deref()),
            }),
            Err(err) => {
                tracing::warn!(method, error = %err, "malformed identity response");
                None
            }
        }
    }

    /// Exchanges the refresh token for a new id token.
    async fn renew(&self, user: &User) -> Option<User> {
        let url = format!("{}/token?key={}", self.token_url, self.api_key);
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", user.refresh_token.as_str()),
        ];
        let res = match self.http.post(url).form(&form).send().await {
            Ok(res) => res,
            Err(err) => {
                tracing::warn!(error = %err, "token refresh failed");
                return None;
            }
        };

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            tracing::warn!(%status, %detail, "token refresh rejected");
            return None;
        }

        match res.json::<TokenResponse>().await {
            Ok(token) => Some(User {
                id_token: token.id_token,
                refresh_token: token.refresh_token,
                expires_at: expiry(Utc::now(), token.expires_in.as_deref()),
                ..user.clone()
            }),
            Err(err) => {
                tracing::warn!(error = %err, "malformed token response");
                None
            }
        }
    }
}

#[async_trait]
impl Identity for FirebaseIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .exchange("signInWithPassword", email, password)
            .await
            .ok_or(AuthError::InvalidCredentials)?;
        self.session.set(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .exchange("signUp", email, password)
            .await
            .ok_or(AuthError::SignUpFailed)?;
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

    /// Falls back to the stale token when renewal fails; the store will then
    /// reject the request and the caller reports that.
    async fn fresh_user(&self) -> Option<User> {
        let user = self.session.get()?;
        let margin = Duration::seconds(REFRESH_MARGIN_SECS);
        if user.refresh_token.is_empty() || !user.token_expires_within(Utc::now(), margin) {
            return Some(user);
        }

        let Some(renewed) = self.renew(&user).await else {
            return Some(user);
        };
        if self.session.refresh(&renewed) {
            tracing::debug!(uid = %renewed.uid, "id token refreshed");
            Some(renewed)
        } else {
            self.session.get()
        }
    }

    fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.session.subscribe()
    }
}
