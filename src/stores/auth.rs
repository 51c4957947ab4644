//! Signed-in session.
//!
//! The access token itself lives in the client's [`SessionToken`]; this
//! store mirrors it into signals for the views and into localStorage so a
//! reload (or another tab) can pick it up.
//!
//! [`SessionToken`]: crate::core::session::SessionToken

use leptos::prelude::*;

use crate::api;
use crate::config::{ACCESS_TOKEN_KEY, USER_INFO_KEY};
use crate::core::error::ApiError;
use crate::core::http::{ApiClient, BrowserTransport, Transport};
use crate::core::storage;
use crate::models::{Credentials, TokenGrant, User};

/// Reactive part of the session. `Copy`, so it can move into callbacks
/// such as the 401 handler without holding the client.
#[derive(Clone, Copy)]
pub struct AuthState {
    pub user: RwSignal<Option<User>>,
    pub token: RwSignal<Option<String>>,
    pub initialized: RwSignal<bool>,
}

impl AuthState {
    fn new() -> Self {
        Self {
            user: RwSignal::new(None),
            token: RwSignal::new(None),
            initialized: RwSignal::new(false),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.with(Option::is_some) && self.user.with(Option::is_some)
    }

    /// Forget the user locally. The token signal follows the session hook.
    pub fn forget_user(&self) {
        self.user.set(None);
        if let Err(err) = storage::remove(USER_INFO_KEY) {
            tracing::warn!(error = %err, "failed to clear stored user");
        }
    }
}

#[derive(Clone)]
pub struct AuthStore<T: Transport = BrowserTransport> {
    client: ApiClient<T>,
    state: AuthState,
}

impl<T: Transport> AuthStore<T> {
    /// Wire the session token to the store: every change (login, rotation,
    /// 401) updates the token signal and the persisted copy.
    pub fn new(client: ApiClient<T>) -> Self {
        let state = AuthState::new();
        let token = state.token;
        client.session().set_persist_hook(move |value| {
            token.set(value.map(str::to_string));
            if let Err(err) = storage::set_or_remove(ACCESS_TOKEN_KEY, value) {
                tracing::warn!(error = %err, "failed to persist access token");
            }
        });
        Self { client, state }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn user(&self) -> Option<User> {
        self.state.user.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.initialized.get()
    }

    /// Id of the signed-in user, for scoping API calls.
    pub fn user_id(&self) -> Result<i64, ApiError> {
        self.state
            .user
            .with_untracked(|user| user.as_ref().map(|u| u.id))
            .ok_or(ApiError::SignedOut)
    }

    /// Restore the session at app start.
    ///
    /// A stored token is checked with whoami. When that fails, or only a
    /// stored user remains, the refresh cookie gets one chance.
    pub async fn init(&self) {
        let stored_token = storage::get(ACCESS_TOKEN_KEY).filter(|t| !t.trim().is_empty());
        let stored_user: Option<User> = storage::get_json(USER_INFO_KEY);
        let had_session = stored_token.is_some() || stored_user.is_some();

        if let Some(token) = stored_token {
            self.client.session().set_quiet(Some(token.clone()));
            self.state.token.set(Some(token));
            self.state.user.set(stored_user);

            match api::auth::me(&self.client).await {
                Ok(user) => {
                    tracing::info!(user = %user.username, "session restored");
                    self.store_user(user);
                    self.state.initialized.set(true);
                    return;
                }
                Err(err) => tracing::info!(error = %err, "stored token rejected"),
            }
        }

        if had_session && self.try_refresh().await.is_ok() {
            self.state.initialized.set(true);
            return;
        }

        self.clear();
        self.state.initialized.set(true);
    }

    async fn try_refresh(&self) -> Result<(), ApiError> {
        let grant = api::auth::refresh(&self.client).await?;
        self.apply_grant(grant).await?;
        tracing::info!("session refreshed");
        Ok(())
    }

    /// Store the token of a grant and resolve the user.
    async fn apply_grant(&self, grant: TokenGrant) -> Result<(), ApiError> {
        self.client.session().set(Some(grant.access_token));
        let user = match grant.user {
            Some(user) => user,
            None => api::auth::me(&self.client).await?,
        };
        self.store_user(user);
        Ok(())
    }

    fn store_user(&self, user: User) {
        if let Err(err) = storage::set_json(USER_INFO_KEY, &user) {
            tracing::warn!(error = %err, "failed to persist user");
        }
        self.state.user.set(Some(user));
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::InvalidInput(
                "Enter a username and password".to_string(),
            ));
        }

        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let grant = api::auth::login(&self.client, &credentials).await?;
        self.apply_grant(grant).await.inspect_err(|_| self.clear())?;
        tracing::info!(user = username, "signed in");
        Ok(())
    }

    /// Sign out on the server (best effort) and locally.
    pub async fn logout(&self) {
        if let Err(err) = api::auth::logout(&self.client).await {
            tracing::warn!(error = %err, "server logout failed");
        }
        self.clear();
        tracing::info!("signed out");
    }

    /// Drop the session locally.
    pub fn clear(&self) {
        self.client.session().set(None);
        self.state.forget_user();
    }

    /// Apply a `storage` event from another tab. Returns `true` when this
    /// tab was signed out by it.
    pub fn apply_storage_change(&self, key: &str, value: Option<String>) -> bool {
        match key {
            ACCESS_TOKEN_KEY => {
                let value = value.filter(|v| !v.trim().is_empty());
                let signed_out = value.is_none() && self.client.session().is_present();
                self.client.session().set_quiet(value.clone());
                self.state.token.set(value);
                if signed_out {
                    tracing::info!("signed out in another tab");
                    self.state.user.set(None);
                }
                signed_out
            }
            USER_INFO_KEY => {
                let user = value.and_then(|raw| serde_json::from_str::<User>(&raw).ok());
                self.state.user.set(user);
                false
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use serde_json::json;

    use super::*;
    use crate::core::http::mock::MockTransport;
    use crate::core::http::{ApiRequest, RawResponse};

    fn store() -> (AuthStore<MockTransport>, ApiClient<MockTransport>, MockTransport) {
        let transport = MockTransport::default();
        let client = ApiClient::new(transport.clone(), "http://api.test");
        (AuthStore::new(client.clone()), client, transport)
    }

    #[tokio::test]
    async fn test_login_sets_session() {
        let (auth, client, transport) = store();
        transport.push_ok(json!({
            "accessToken": "tok",
            "user": { "id": 7, "username": "ada" }
        }));

        auth.login("ada", "pw").await.unwrap();

        assert_eq!(client.session().get().as_deref(), Some("tok"));
        assert_eq!(auth.state().token.get_untracked().as_deref(), Some("tok"));
        assert_eq!(auth.user_id(), Ok(7));
        assert!(auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_validates_input() {
        let (auth, _, transport) = store();
        let err = auth.login("  ", "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_login_failure_does_not_trip_gate() {
        let (auth, client, transport) = store();
        let tripped = Arc::new(AtomicBool::new(false));
        let flag = tripped.clone();
        client.set_unauthorized_handler(move || flag.store(true, Ordering::SeqCst));
        transport.push_envelope(401, "Bad credentials", json!(null));

        let err = auth.login("ada", "wrong").await.unwrap_err();

        assert_eq!(err, ApiError::Unauthorized);
        assert!(!tripped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_rotation_updates_token_signal() {
        let (auth, client, transport) = store();
        client.session().set(Some("old".into()));
        transport.push_response(RawResponse {
            status: 200,
            headers: vec![("x-new-token".into(), "new".into())],
            body: br#"{"code":200,"data":null}"#.to_vec(),
        });

        let () = client
            .send(ApiRequest::get("/api/x"))
            .await
            .unwrap();

        assert_eq!(auth.state().token.get_untracked().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_init_without_session_stays_signed_out() {
        let (auth, _, transport) = store();

        auth.init().await;

        assert!(auth.is_initialized());
        assert!(!auth.is_authenticated());
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_other_tab_sign_out() {
        let (auth, client, _) = store();
        client.session().set(Some("tok".into()));
        auth.state().user.set(Some(User {
            id: 1,
            username: "ada".into(),
            nickname: None,
            email: None,
            avatar: None,
            role: None,
        }));

        assert!(!auth.apply_storage_change(ACCESS_TOKEN_KEY, Some("tok2".into())));
        assert_eq!(client.session().get().as_deref(), Some("tok2"));

        assert!(auth.apply_storage_change(ACCESS_TOKEN_KEY, None));
        assert_eq!(client.session().get(), None);
        assert!(!auth.is_authenticated());
    }
}
