//! Client state shared across the embedding application.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::session::{SessionProvider, SessionSynchronizer};
use crate::storage::{FileStorage, MemoryStorage, SharedStorage};
use crate::store::{AuthStore, CartStore, FavoritesStore, wire_auth_reactions};

/// The assembled client: config, storage, API, and the three stores, wired
/// together.
///
/// This struct is cheaply cloneable via `Arc`; the embedding application
/// keeps one and hands clones to whatever needs state access.
#[derive(Clone)]
pub struct TiffinClient {
    inner: Arc<TiffinClientInner>,
}

struct TiffinClientInner {
    config: ClientConfig,
    storage: SharedStorage,
    api: ApiClient,
    cart: CartStore,
    auth: AuthStore,
    favorites: FavoritesStore,
}

impl TiffinClient {
    /// Build a client from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or the
    /// HTTP client cannot be constructed.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Build a client from an explicit configuration.
    ///
    /// Storage is file-backed when the configuration names a directory,
    /// in-memory otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let storage: SharedStorage = match &config.storage_dir {
            Some(dir) => Arc::new(FileStorage::new(dir.clone())),
            None => Arc::new(MemoryStorage::new()),
        };
        Self::with_storage(config, storage)
    }

    /// Build a client over a caller-supplied storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_storage(config: ClientConfig, storage: SharedStorage) -> Result<Self> {
        let api = ApiClient::new(&config, Arc::clone(&storage))?;
        let cart = CartStore::new(Arc::clone(&storage));
        let auth = AuthStore::new(Arc::clone(&storage));
        let favorites = FavoritesStore::new(api.clone(), Arc::clone(&storage));

        // Reactions must observe every transition, including hydration.
        wire_auth_reactions(&auth, &cart);

        Ok(Self {
            inner: Arc::new(TiffinClientInner {
                config,
                storage,
                api,
                cart,
                auth,
                favorites,
            }),
        })
    }

    /// Load the persisted cart and auth snapshots. Idempotent.
    pub fn hydrate(&self) {
        self.inner.cart.hydrate();
        self.inner.auth.hydrate();
    }

    /// Build a session synchronizer around this client's handles.
    pub fn synchronizer<P: SessionProvider>(&self, provider: P) -> SessionSynchronizer<P> {
        SessionSynchronizer::new(
            provider,
            self.inner.api.clone(),
            self.inner.auth.clone(),
            self.inner.favorites.clone(),
            Arc::clone(&self.inner.storage),
        )
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a handle to the storage backend.
    #[must_use]
    pub fn storage(&self) -> SharedStorage {
        Arc::clone(&self.inner.storage)
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the auth store.
    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        &self.inner.auth
    }

    /// Get a reference to the favorites store.
    #[must_use]
    pub fn favorites(&self) -> &FavoritesStore {
        &self.inner.favorites
    }
}
