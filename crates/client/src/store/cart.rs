//! Persisted cart store.

use rust_decimal::Decimal;
use tracing::debug;

use tiffin_core::cart::{Cart, CartItem, CartItemInput};

use crate::persist::PersistedStore;
use crate::storage::{SharedStorage, keys};

/// Cart state persisted under [`keys::CART_STORE`].
///
/// Every mutation goes through the backing [`PersistedStore`], so it is
/// immediately visible in memory and written through to storage
/// fire-and-forget. All operations are total; there are no error cases.
#[derive(Clone)]
pub struct CartStore {
    store: PersistedStore<Cart>,
}

impl CartStore {
    /// Create a cart store over the shared storage backend.
    #[must_use]
    pub fn new(storage: SharedStorage) -> Self {
        let store = PersistedStore::new(storage, keys::CART_STORE).with_on_hydrate(|cart: &Cart| {
            debug!(items = cart.item_count(), "cart restored");
        });
        Self { store }
    }

    /// Load the persisted cart. Idempotent.
    pub fn hydrate(&self) {
        self.store.hydrate();
    }

    /// Whether the persisted cart has been loaded.
    #[must_use]
    pub fn has_hydrated(&self) -> bool {
        self.store.has_hydrated()
    }

    /// Add one unit of a product. Re-adding an existing id only bumps its
    /// quantity; the stored price and name stay as first added.
    pub fn add_item(&self, item: CartItemInput) {
        self.store.update(|cart| cart.add_item(item));
    }

    /// Remove a line entirely. No-op if absent.
    pub fn remove_item(&self, id: &str) {
        self.store.update(|cart| cart.remove_item(id));
    }

    /// Set a line's quantity; zero removes the line. No-op if absent.
    pub fn update_quantity(&self, id: &str, quantity: u32) {
        self.store.update(|cart| cart.update_quantity(id, quantity));
    }

    /// Empty the cart unconditionally.
    pub fn clear(&self) {
        self.store.update(Cart::clear);
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.store.read(Cart::total_price)
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.store.read(Cart::total_items)
    }

    /// Quantity for a product id, 0 if absent.
    #[must_use]
    pub fn item_quantity(&self, id: &str) -> u32 {
        self.store.read(|cart| cart.item_quantity(id))
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.store.read(|cart| cart.items().to_vec())
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.read(Cart::is_empty)
    }

    /// Register a callback fired after every cart mutation.
    pub fn subscribe(&self, f: impl Fn(&Cart) + Send + Sync + 'static) {
        self.store.subscribe(f);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStorage;

    fn biryani() -> CartItemInput {
        CartItemInput {
            id: "p-1".to_string(),
            name: "Chicken Biryani".to_string(),
            price: Decimal::from(350),
            image: None,
        }
    }

    #[test]
    fn test_cart_survives_restart() {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());

        let cart = CartStore::new(Arc::clone(&storage));
        cart.add_item(biryani());
        cart.add_item(biryani());

        let reopened = CartStore::new(storage);
        reopened.hydrate();
        assert_eq!(reopened.item_quantity("p-1"), 2);
        assert_eq!(reopened.total_price(), Decimal::from(700));
    }

    #[test]
    fn test_totals_follow_mutations() {
        let cart = CartStore::new(Arc::new(MemoryStorage::new()));
        cart.add_item(biryani());
        cart.update_quantity("p-1", 4);
        assert_eq!(cart.total_items(), 4);

        assert_eq!(cart.total_price(), Decimal::from(1400));

        cart.update_quantity("p-1", 0);
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_subscriber_sees_each_change() {
        let counts = Arc::new(std::sync::Mutex::new(Vec::new()));
        let counts_clone = Arc::clone(&counts);

        let cart = CartStore::new(Arc::new(MemoryStorage::new()));
        cart.subscribe(move |state| {
            counts_clone.lock().unwrap().push(state.total_items());
        });

        cart.add_item(biryani());
        cart.add_item(biryani());
        cart.clear();

        assert_eq!(*counts.lock().unwrap(), vec![1, 2, 0]);
    }
}
