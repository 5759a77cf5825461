//! Integration tests for Tiffin.
//!
//! The suites under `tests/` exercise the client crate end to end against a
//! mock backend; no external services are required.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tiffin-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart snapshots across restarts
//! - `favorites_sync` - Optimistic favorites against the backend
//! - `session_flow` - Session reconciliation and logout
//! - `api_client` - Token refresh, error mapping, delivery endpoints

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use httpmock::MockServer;
use serde_json::{Value, json};

use tiffin_client::TiffinClient;
use tiffin_client::config::ClientConfig;
use tiffin_client::session::{ProviderError, SessionProvider};
use tiffin_client::storage::{MemoryStorage, SharedStorage, StorageBackend, keys};

/// A client wired to a fresh mock backend over in-memory storage.
pub struct TestBackend {
    /// The mock backend.
    pub server: MockServer,
    /// The assembled client under test.
    pub client: TiffinClient,
    /// Direct handle to the storage the client uses.
    pub storage: Arc<MemoryStorage>,
}

impl TestBackend {
    /// Start a mock backend and build a client against it.
    ///
    /// # Panics
    ///
    /// Panics when the client cannot be constructed; this is test setup.
    pub async fn start() -> Self {
        let server = MockServer::start_async().await;
        let storage = Arc::new(MemoryStorage::new());
        let shared: SharedStorage = storage.clone();
        let config = ClientConfig::for_base_url(server.base_url());
        let client = TiffinClient::with_storage(config, shared).expect("client construction");

        Self {
            server,
            client,
            storage,
        }
    }

    /// Store a backend token pair as if a login already happened.
    ///
    /// # Panics
    ///
    /// Panics when the in-memory storage rejects a write; this is test setup.
    pub fn seed_tokens(&self, access: &str, refresh: &str) {
        self.storage
            .set(keys::ACCESS_TOKEN, access)
            .expect("seed access token");
        self.storage
            .set(keys::REFRESH_TOKEN, refresh)
            .expect("seed refresh token");
    }

    /// Read a raw storage value.
    ///
    /// # Panics
    ///
    /// Panics when the in-memory storage fails, which it does not.
    #[must_use]
    pub fn stored(&self, key: &str) -> Option<String> {
        self.storage.get(key).expect("storage read")
    }
}

/// A session provider that records sign-out calls and always succeeds.
#[derive(Default)]
pub struct RecordingProvider {
    sign_outs: AtomicUsize,
}

impl RecordingProvider {
    /// Number of times `sign_out` ran.
    #[must_use]
    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

impl SessionProvider for RecordingProvider {
    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A session provider shared between the synchronizer and assertions.
#[derive(Clone, Default)]
pub struct SharedProvider(pub Arc<RecordingProvider>);

impl SessionProvider for SharedProvider {
    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.0.sign_out().await
    }
}

/// Backend wire fixture for one favorite product record.
#[must_use]
pub fn favorite_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "price": 12.5,
        "image": "https://cdn.tiffin.pk/img.png",
        "description": "A staple",
        "brand": "Tiffin Kitchen",
        "old_price": null,
        "is_discount": false,
        "type": "food"
    })
}

/// Backend wire fixture for the `/auth/me` profile.
#[must_use]
pub fn profile_json(id: i64, email: &str, username: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "username": username,
        "name": null,
        "phone": null,
        "address": null
    })
}
