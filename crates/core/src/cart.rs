//! Pure shopping-cart state machine.
//!
//! The cart is a mapping of item id to a frozen product snapshot plus a
//! quantity, with derived totals. Every operation is synchronous and total:
//! removing an absent item or updating an absent id is a no-op, never an
//! error. Persistence and cross-store reactions live in `tiffin-client`;
//! this module never does I/O.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An item held in the cart.
///
/// The name, price, and image are frozen at the time of first insertion:
/// re-adding the same id only increments the quantity and never rewrites the
/// snapshot, so the cart keeps displaying what the user originally added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identifier (backend slug or numeric id rendered as a string).
    pub id: String,
    /// Product name at time of adding (frozen).
    pub name: String,
    /// Unit price at time of adding (frozen).
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    /// Quantity in cart, always >= 1 while the entry exists.
    pub quantity: u32,
    /// Product image URL, if any.
    pub image: Option<String>,
}

/// Input for adding an item to the cart.
///
/// Carries no quantity: a first add inserts with quantity 1, a repeat add
/// increments the existing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItemInput {
    /// Product identifier.
    pub id: String,
    /// Product name.
    pub name: String,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    /// Product image URL, if any.
    pub image: Option<String>,
}

/// The shopping cart.
///
/// ## Invariants
///
/// - At most one entry per item id (adding the same id increments quantity).
/// - Quantity is at least 1 while an entry exists; an update to 0 removes it.
/// - Entries keep their insertion order, so a rehydrated cart lists items in
///   the order the user added them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create a new empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add an item, or increment its quantity if the id is already present.
    ///
    /// A repeat add does not touch the stored name, price, or image; the
    /// snapshot from the first insertion wins.
    pub fn add_item(&mut self, input: CartItemInput) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == input.id) {
            item.quantity += 1;
            return;
        }

        self.items.push(CartItem {
            id: input.id,
            name: input.name,
            price: input.price,
            quantity: 1,
            image: input.image,
        });
    }

    /// Remove the entry with the given id. No-op if the id is absent.
    pub fn remove_item(&mut self, id: &str) {
        self.items.retain(|i| i.id != id);
    }

    /// Set the quantity of an existing entry.
    ///
    /// A quantity of 0 removes the entry (negative quantities are not
    /// representable). No-op if the id is absent.
    pub fn update_quantity(&mut self, id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove_item(id);
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.quantity = quantity;
        }
    }

    /// Remove every entry unconditionally.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `price * quantity` over all entries; zero for an empty cart.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .map(|i| i.price * Decimal::from(i.quantity))
            .sum()
    }

    /// Sum of quantities over all entries.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Quantity of the entry with the given id, or 0 if absent.
    #[must_use]
    pub fn item_quantity(&self, id: &str) -> u32 {
        self.items
            .iter()
            .find(|i| i.id == id)
            .map_or(0, |i| i.quantity)
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct entries.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// True when the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(id: &str, price: Decimal) -> CartItemInput {
        CartItemInput {
            id: id.to_string(),
            name: format!("Item {id}"),
            price,
            image: None,
        }
    }

    #[test]
    fn test_add_item_inserts_with_quantity_one() {
        let mut cart = Cart::new();
        cart.add_item(input("A", Decimal::new(999, 2)));

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.item_quantity("A"), 1);
    }

    #[test]
    fn test_add_same_id_increments_instead_of_duplicating() {
        let mut cart = Cart::new();
        cart.add_item(input("A", Decimal::new(999, 2)));
        cart.add_item(input("A", Decimal::new(999, 2)));

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.item_quantity("A"), 2);
    }

    #[test]
    fn test_re_add_keeps_first_snapshot() {
        let mut cart = Cart::new();
        cart.add_item(CartItemInput {
            id: "A".to_string(),
            name: "Original".to_string(),
            price: Decimal::new(500, 2),
            image: None,
        });
        cart.add_item(CartItemInput {
            id: "A".to_string(),
            name: "Renamed".to_string(),
            price: Decimal::new(900, 2),
            image: Some("new.png".to_string()),
        });

        let item = &cart.items()[0];
        assert_eq!(item.name, "Original");
        assert_eq!(item.price, Decimal::new(500, 2));
        assert_eq!(item.image, None);
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_remove_item_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(input("A", Decimal::new(100, 2)));
        cart.remove_item("B");

        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add_item(input("A", Decimal::new(100, 2)));
        cart.update_quantity("A", 3);
        assert_eq!(cart.item_quantity("A"), 3);

        cart.update_quantity("A", 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_absent_is_noop() {
        let mut cart = Cart::new();
        cart.update_quantity("ghost", 5);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_follow_quantities() {
        let mut cart = Cart::new();
        cart.add_item(input("A", Decimal::new(250, 2))); // 2.50
        cart.add_item(input("B", Decimal::new(1000, 2))); // 10.00
        cart.add_item(input("A", Decimal::new(250, 2)));
        cart.update_quantity("B", 3);

        assert_eq!(cart.total_items(), 5);
        // 2 * 2.50 + 3 * 10.00
        assert_eq!(cart.total_price(), Decimal::new(3500, 2));

        cart.remove_item("A");
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Decimal::new(3000, 2));
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let cart = Cart::new();
        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.item_quantity("A"), 0);
    }

    #[test]
    fn test_clear_empties_unconditionally() {
        let mut cart = Cart::new();
        cart.add_item(input("A", Decimal::new(100, 2)));
        cart.add_item(input("B", Decimal::new(200, 2)));

        cart.clear();
        assert!(cart.is_empty());
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = Cart::new();
        cart.add_item(input("B", Decimal::new(100, 2)));
        cart.add_item(input("A", Decimal::new(100, 2)));
        cart.add_item(input("C", Decimal::new(100, 2)));
        cart.add_item(input("A", Decimal::new(100, 2)));

        let ids: Vec<_> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_serde_roundtrip_preserves_items() {
        let mut cart = Cart::new();
        cart.add_item(input("A", Decimal::new(1999, 2)));
        cart.update_quantity("A", 4);

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
        assert_eq!(restored.total_price(), Decimal::new(7996, 2));
    }
}
