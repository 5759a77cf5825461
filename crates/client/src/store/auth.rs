//! Persisted auth store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tiffin_core::profile::UserProfile;

use crate::persist::PersistedStore;
use crate::session::SessionProvider;
use crate::storage::{SharedStorage, keys};

/// The persisted auth snapshot: who is signed in, and whether we treat the
/// session as authenticated.
///
/// The flag is usually derived from user presence, but can be set on its own
/// for the degraded provider-only path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    /// The signed-in user, if any.
    pub user: Option<UserProfile>,
    /// Whether the client currently treats the session as authenticated.
    pub is_authenticated: bool,
}

/// Auth state persisted under [`keys::AUTH_STORE`].
#[derive(Clone)]
pub struct AuthStore {
    store: PersistedStore<AuthState>,
    storage: SharedStorage,
}

impl AuthStore {
    /// Create an auth store over the shared storage backend.
    #[must_use]
    pub fn new(storage: SharedStorage) -> Self {
        let store = PersistedStore::new(Arc::clone(&storage), keys::AUTH_STORE);
        Self { store, storage }
    }

    /// Load the persisted auth snapshot. Idempotent.
    pub fn hydrate(&self) {
        self.store.hydrate();
    }

    /// Whether the persisted snapshot has been loaded. Readers should treat
    /// auth state as unknown until this flips.
    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.store.has_hydrated()
    }

    /// Set the one-way hydration flag. Passing `false` does nothing.
    pub fn set_hydrated(&self, hydrated: bool) {
        if hydrated {
            self.store.mark_hydrated();
        }
    }

    /// Clone of the current auth state.
    #[must_use]
    pub fn current(&self) -> AuthState {
        self.store.get()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.store.read(|state| state.user.clone())
    }

    /// Whether the client currently treats the session as authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.read(|state| state.is_authenticated)
    }

    /// Set the user and derive the authenticated flag from presence.
    pub fn set_user(&self, user: Option<UserProfile>) {
        self.store.update(|state| {
            state.is_authenticated = user.is_some();
            state.user = user;
        });
    }

    /// Set the authenticated flag on its own, leaving the user untouched.
    pub fn set_authenticated(&self, authenticated: bool) {
        self.store
            .update(|state| state.is_authenticated = authenticated);
    }

    /// Register a callback fired after every auth mutation.
    pub fn subscribe(&self, f: impl Fn(&AuthState) + Send + Sync + 'static) {
        self.store.subscribe(f);
    }

    /// End the session everywhere: durable snapshots, the external session
    /// provider, then memory.
    ///
    /// Idempotent. Provider sign-out failure is logged, never propagated; the
    /// local state is reset regardless.
    pub async fn logout(&self, provider: &impl SessionProvider) {
        for key in [keys::AUTH_STORE, keys::CART_STORE] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "failed to clear persisted state");
            }
        }

        if let Err(e) = provider.sign_out().await {
            warn!(error = %e, "session provider sign-out failed");
        }

        self.store.set(AuthState::default());
        info!("logged out");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tiffin_core::types::{Email, UserId};

    use super::*;
    use crate::storage::MemoryStorage;

    fn profile() -> UserProfile {
        UserProfile::with_derived_username(
            UserId::new(7),
            Email::parse("a@b.com").unwrap(),
            None,
        )
    }

    #[test]
    fn test_set_user_derives_flag() {
        let auth = AuthStore::new(Arc::new(MemoryStorage::new()));

        auth.set_user(Some(profile()));
        assert!(auth.is_authenticated());

        auth.set_user(None);
        assert!(!auth.is_authenticated());
        assert_eq!(auth.user(), None);
    }

    #[test]
    fn test_set_authenticated_is_independent() {
        let auth = AuthStore::new(Arc::new(MemoryStorage::new()));

        auth.set_authenticated(true);
        assert!(auth.is_authenticated());
        assert_eq!(auth.user(), None);
    }

    #[test]
    fn test_hydration_flag_is_one_way() {
        let auth = AuthStore::new(Arc::new(MemoryStorage::new()));
        assert!(!auth.is_hydrated());

        auth.set_hydrated(false);
        assert!(!auth.is_hydrated());

        auth.set_hydrated(true);
        assert!(auth.is_hydrated());

        auth.set_hydrated(false);
        assert!(auth.is_hydrated());
    }

    #[test]
    fn test_auth_survives_restart() {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());

        let auth = AuthStore::new(Arc::clone(&storage));
        auth.set_user(Some(profile()));

        let reopened = AuthStore::new(storage);
        reopened.hydrate();
        assert!(reopened.is_authenticated());
        assert_eq!(reopened.user().unwrap().username, "a");
    }
}
