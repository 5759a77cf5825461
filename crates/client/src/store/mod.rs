//! State stores and their cross-wiring.
//!
//! Each store is a cheaply clonable handle over shared state. The stores do
//! not know about each other; reactions between them are registered
//! explicitly by [`wire_auth_reactions`] so the dependency stays one-way and
//! visible in one place.

mod auth;
mod cart;
mod favorites;

pub use auth::{AuthState, AuthStore};
pub use cart::CartStore;
pub use favorites::FavoritesStore;

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

/// Register the auth-to-cart reaction: the cart is emptied when auth
/// transitions from authenticated to not authenticated while items exist.
///
/// This reacts to the edge, not the level, so a signed-out hydration does not
/// wipe a guest cart. Call before hydrating the stores.
pub fn wire_auth_reactions(auth: &AuthStore, cart: &CartStore) {
    let cart = cart.clone();
    let was_authenticated = AtomicBool::new(false);
    auth.subscribe(move |state| {
        let was = was_authenticated.swap(state.is_authenticated, Ordering::AcqRel);
        if was && !state.is_authenticated && !cart.is_empty() {
            debug!("authentication lost, clearing cart");
            cart.clear();
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use tiffin_core::cart::CartItemInput;
    use tiffin_core::profile::UserProfile;
    use tiffin_core::types::{Email, UserId};

    use super::*;
    use crate::storage::{MemoryStorage, SharedStorage, StorageBackend, keys};

    fn stores() -> (AuthStore, CartStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let shared: SharedStorage = storage.clone();
        let auth = AuthStore::new(Arc::clone(&shared));
        let cart = CartStore::new(shared);
        wire_auth_reactions(&auth, &cart);
        (auth, cart, storage)
    }

    fn profile() -> UserProfile {
        UserProfile::with_derived_username(
            UserId::new(1),
            Email::parse("a@b.com").unwrap(),
            None,
        )
    }

    fn naan() -> CartItemInput {
        CartItemInput {
            id: "naan".to_string(),
            name: "Garlic Naan".to_string(),
            price: Decimal::from(80),
            image: None,
        }
    }

    #[test]
    fn test_losing_auth_clears_cart() {
        let (auth, cart, _storage) = stores();

        auth.set_user(Some(profile()));
        cart.add_item(naan());
        assert_eq!(cart.total_items(), 1);

        auth.set_user(None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_guest_cart_survives_signed_out_hydration() {
        let storage = Arc::new(MemoryStorage::new());
        let shared: SharedStorage = storage.clone();

        // A previous guest visit left a cart behind.
        {
            let cart = CartStore::new(Arc::clone(&shared));
            cart.add_item(naan());
        }
        assert!(storage.get(keys::CART_STORE).unwrap().is_some());

        let auth = AuthStore::new(Arc::clone(&shared));
        let cart = CartStore::new(shared);
        wire_auth_reactions(&auth, &cart);

        cart.hydrate();
        auth.hydrate();

        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_flag_only_transition_also_clears() {
        let (auth, cart, _storage) = stores();

        auth.set_authenticated(true);
        cart.add_item(naan());

        auth.set_authenticated(false);
        assert!(cart.is_empty());
    }
}
