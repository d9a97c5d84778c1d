//! Authentication state shared by every view.
//!
//! The store owns the persisted bearer token and the cached profile. A user
//! counts as logged in only once the profile has been fetched with the
//! token; a stored token alone is never treated as proof of identity.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, LoginRequest, User};
use crate::storage::{ClientStorage, TOKEN_KEY};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Start-up profile check has not resolved yet.
    Loading,
    Ready,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub user: Option<User>,
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SessionPhase::Loading
    }
}

pub struct SessionStore {
    api: ApiClient,
    storage: Arc<dyn ClientStorage>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(api: ApiClient, storage: Arc<dyn ClientStorage>) -> Self {
        let (state, _) = watch::channel(SessionState {
            phase: SessionPhase::Loading,
            user: None,
        });
        Self {
            api,
            storage,
            state,
        }
    }

    /// Receives a new snapshot every time the session changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_logged_in()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Start-up check: validates a persisted token, if any, then marks the
    /// store ready. Consumers should render a loading state until then.
    pub async fn initialize(&self) {
        if self.storage.get(TOKEN_KEY).is_some() {
            debug!("Found persisted token, validating it");
            self.refresh_profile().await;
        }
        self.state.send_modify(|s| s.phase = SessionPhase::Ready);
    }

    /// Persists `token` and loads the profile with it.
    ///
    /// Failures are not reported to the caller: the token is discarded and
    /// the session simply stays logged out. Returns whether the user is now
    /// logged in.
    pub async fn login(&self, token: &str) -> bool {
        if let Err(err) = self.storage.set(TOKEN_KEY, token) {
            warn!("Could not persist session token: {}", err);
        }
        let logged_in = self.refresh_profile().await;
        self.state.send_modify(|s| s.phase = SessionPhase::Ready);
        logged_in
    }

    /// Posts credentials and, on success, logs in with the returned token.
    ///
    /// Credential errors come back as `Err` so the login form can show the
    /// server's message; a token that then fails the profile check yields
    /// `Ok(None)`.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Option<User>, ApiError> {
        let response = self
            .api
            .login(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;
        if self.login(&response.access_token).await {
            info!("Signed in as {}", username);
            Ok(self.user())
        } else {
            Ok(None)
        }
    }

    pub fn logout(&self) {
        if let Err(err) = self.storage.remove(TOKEN_KEY) {
            warn!("Could not remove session token: {}", err);
        }
        self.state.send_modify(|s| s.user = None);
        info!("Logged out");
    }

    /// Handles the OAuth redirect: a `token` query parameter is stored once
    /// through [`SessionStore::login`] and removed from the returned URL.
    /// URLs without a token come back unchanged.
    pub async fn capture_oauth_redirect(&self, url: &str) -> String {
        let (scrubbed, token) = take_query_param(url, "token");
        match token {
            Some(token) if !token.is_empty() => {
                info!("Captured token from OAuth redirect");
                self.login(&token).await;
                scrubbed
            }
            _ => url.to_string(),
        }
    }

    async fn refresh_profile(&self) -> bool {
        match self.api.profile().await {
            Ok(user) => {
                debug!("Profile loaded for {}", user.username);
                self.state.send_modify(|s| s.user = Some(user));
                true
            }
            Err(err) => {
                warn!("Authentication check failed: {}", err);
                if let Err(err) = self.storage.remove(TOKEN_KEY) {
                    warn!("Could not remove session token: {}", err);
                }
                self.state.send_modify(|s| s.user = None);
                false
            }
        }
    }
}

/// Removes `key` from the query string of `url`, returning the rewritten URL
/// and the decoded value of the first occurrence.
pub fn take_query_param(url: &str, key: &str) -> (String, Option<String>) {
    let (without_fragment, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let Some((base, query)) = without_fragment.split_once('?') else {
        return (url.to_string(), None);
    };

    let mut value = None;
    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| {
            let (name, raw) = pair.split_once('=').unwrap_or((pair, ""));
            if name != key {
                return !pair.is_empty();
            }
            if value.is_none() {
                value = Some(
                    urlencoding::decode(raw)
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| raw.to_string()),
                );
            }
            false
        })
        .collect();

    let mut rebuilt = base.to_string();
    if !kept.is_empty() {
        rebuilt.push('?');
        rebuilt.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        rebuilt.push('#');
        rebuilt.push_str(fragment);
    }
    (rebuilt, value)
}
