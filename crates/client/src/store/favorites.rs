//! Server-synchronized favorites store with optimistic updates.
//!
//! Favorites are never persisted locally; the set lives in memory and on the
//! server. Mutations apply locally first and roll back to the pre-call
//! snapshot when the server rejects them. A full reload is guarded by the
//! presence of a stored access token and fails safe to an empty set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use tiffin_core::ProductId;
use tiffin_core::favorites::{FavoriteItem, FavoriteSet};

use crate::api::ApiClient;
use crate::storage::{SharedStorage, keys};

/// In-memory favorites set kept in sync with the backend.
#[derive(Clone)]
pub struct FavoritesStore {
    inner: Arc<FavoritesInner>,
}

struct FavoritesInner {
    set: RwLock<FavoriteSet>,
    loading: AtomicBool,
    api: ApiClient,
    storage: SharedStorage,
}

impl FavoritesStore {
    /// Create a favorites store backed by the given API client.
    #[must_use]
    pub fn new(api: ApiClient, storage: SharedStorage) -> Self {
        Self {
            inner: Arc::new(FavoritesInner {
                set: RwLock::new(FavoriteSet::default()),
                loading: AtomicBool::new(false),
                api,
                storage,
            }),
        }
    }

    /// The current favorites, in insertion order.
    #[must_use]
    pub fn favorites(&self) -> Vec<FavoriteItem> {
        self.read().items().to_vec()
    }

    /// Synchronous membership test.
    #[must_use]
    pub fn is_favorite(&self, id: ProductId) -> bool {
        self.read().contains(id)
    }

    /// True while a full server reload is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::Acquire)
    }

    /// Replace the whole set, deduplicating on id (first occurrence wins).
    pub fn set_favorites(&self, items: Vec<FavoriteItem>) {
        self.write().replace_all(items);
    }

    /// Optimistically add a favorite, then confirm with the server.
    ///
    /// An id that is already present is a no-op with no network call. On
    /// server rejection the set is restored to the pre-call snapshot, not
    /// recomputed.
    pub async fn add_to_favorites(&self, item: FavoriteItem) {
        let id = item.id;
        let snapshot = {
            let mut set = self.write();
            let snapshot = set.clone();
            if !set.insert(item) {
                return;
            }
            snapshot
        };

        if let Err(e) = self.inner.api.add_favorite(id).await {
            warn!(product_id = %id, error = %e, "favorite add rejected, rolling back");
            *self.write() = snapshot;
        }
    }

    /// Optimistically remove a favorite, then confirm with the server.
    ///
    /// An absent id still issues the server call; the server owns membership.
    /// On rejection the set is restored to the pre-call snapshot.
    pub async fn remove_from_favorites(&self, id: ProductId) {
        let snapshot = {
            let mut set = self.write();
            let snapshot = set.clone();
            set.remove(id);
            snapshot
        };

        if let Err(e) = self.inner.api.remove_favorite(id).await {
            warn!(product_id = %id, error = %e, "favorite remove rejected, rolling back");
            *self.write() = snapshot;
        }
    }

    /// Reload the set from the server.
    ///
    /// Without a stored access token this clears the set and returns before
    /// any network call. A failed reload also clears the set; favorites fail
    /// safe to empty rather than showing a stale list.
    pub async fn load_from_server(&self) {
        if self.stored_access_token().is_none() {
            debug!("no stored access token, clearing favorites");
            self.write().clear();
            return;
        }

        self.inner.loading.store(true, Ordering::Release);
        match self.inner.api.favorites().await {
            Ok(items) => {
                let count = items.len();
                self.write().replace_all(items);
                debug!(count, "favorites loaded");
            }
            Err(e) => {
                warn!(error = %e, "favorites load failed, clearing");
                self.write().clear();
            }
        }
        self.inner.loading.store(false, Ordering::Release);
    }

    fn stored_access_token(&self) -> Option<String> {
        match self.inner.storage.get(keys::ACCESS_TOKEN) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "failed to read stored access token");
                None
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, FavoriteSet> {
        self.inner.set.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, FavoriteSet> {
        self.inner.set.write().unwrap_or_else(PoisonError::into_inner)
    }
}
