//! Client-side wiring for end-to-end tests
//!
//! Builds the same object graph the shell uses (storage, API client,
//! session store) against a mock backend.

use super::constants::*;
use audionorm_client::api::ApiClient;
use audionorm_client::session::SessionStore;
use audionorm_client::storage::{ClientStorage, MemoryStorage, TOKEN_KEY};
use std::sync::Arc;

pub struct TestContext {
    pub storage: Arc<dyn ClientStorage>,
    pub api: ApiClient,
    pub session: SessionStore,
}

impl TestContext {
    /// No persisted token; the session is not initialized yet.
    pub fn anonymous(base_url: &str) -> Self {
        Self::with_storage(base_url, Arc::new(MemoryStorage::new()))
    }

    pub fn with_storage(base_url: &str, storage: Arc<dyn ClientStorage>) -> Self {
        let api = ApiClient::new(base_url, storage.clone()).expect("Failed to build API client");
        let session = SessionStore::new(api.clone(), storage.clone());
        Self {
            storage,
            api,
            session,
        }
    }

    /// Persisted valid token and an initialized, logged in session.
    ///
    /// # Panics
    ///
    /// Panics if the backend rejects the test token.
    pub async fn authenticated(base_url: &str) -> Self {
        let context = Self::anonymous(base_url);
        context
            .storage
            .set(TOKEN_KEY, TEST_TOKEN)
            .expect("Failed to store token");
        context.session.initialize().await;
        assert!(
            context.session.is_logged_in(),
            "Test token was not accepted by the mock backend"
        );
        context
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }
}
