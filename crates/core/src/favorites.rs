//! Favorite-item set.
//!
//! Favorites are server-sourced: the set here is the in-memory mirror the
//! client mutates optimistically before the backend confirms. Rollback works
//! by cloning the set before a speculative mutation and assigning the clone
//! back on failure, so every operation keeps the whole set cheap to copy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// A favorited product as the backend reports it.
///
/// Only `id` and `name` are always present; the rest mirror the product
/// record and may be omitted by older backend versions. The wire field
/// `type` maps to [`kind`](Self::kind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
    /// Backend product id.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Current unit price.
    pub price: Option<Decimal>,
    /// Product image URL.
    pub image: Option<String>,
    /// Product description.
    pub description: Option<String>,
    /// Brand name.
    pub brand: Option<String>,
    /// Pre-discount price, when the product is on sale.
    pub old_price: Option<Decimal>,
    /// Whether the product is currently discounted.
    pub is_discount: Option<bool>,
    /// Product category, named `type` on the wire.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// An ordered set of favorite items, unique by product id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavoriteSet {
    items: Vec<FavoriteItem>,
}

impl FavoriteSet {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Replace the whole set, deduplicating on id (first occurrence wins).
    ///
    /// Used after a full server reload.
    pub fn replace_all(&mut self, items: Vec<FavoriteItem>) {
        self.items.clear();
        for item in items {
            if !self.contains(item.id) {
                self.items.push(item);
            }
        }
    }

    /// Append an item if its id is not already present.
    ///
    /// Returns `true` when the item was inserted, `false` when the id was
    /// already a member (the existing entry is left untouched).
    pub fn insert(&mut self, item: FavoriteItem) -> bool {
        if self.contains(item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove the item with the given id.
    ///
    /// Returns `true` when an entry was removed.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    /// Membership test by id.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    /// Drop every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[FavoriteItem] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the set holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i64) -> FavoriteItem {
        FavoriteItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Some(Decimal::new(500, 2)),
            image: None,
            description: None,
            brand: None,
            old_price: None,
            is_discount: None,
            kind: None,
        }
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut set = FavoriteSet::new();
        assert!(set.insert(item(1)));
        assert!(!set.insert(item(1)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_reports_membership() {
        let mut set = FavoriteSet::new();
        set.insert(item(1));

        assert!(set.remove(ProductId::new(1)));
        assert!(!set.remove(ProductId::new(1)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_replace_all_dedupes_first_wins() {
        let mut set = FavoriteSet::new();
        set.insert(item(9));

        let mut dup = item(2);
        dup.name = "First".to_string();
        let mut dup2 = item(2);
        dup2.name = "Second".to_string();

        set.replace_all(vec![item(1), dup, dup2]);

        assert_eq!(set.len(), 2);
        assert!(!set.contains(ProductId::new(9)));
        assert_eq!(set.items()[1].name, "First");
    }

    #[test]
    fn test_clone_is_an_independent_snapshot() {
        let mut set = FavoriteSet::new();
        set.insert(item(1));

        let snapshot = set.clone();
        set.insert(item(2));
        set.remove(ProductId::new(1));

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains(ProductId::new(1)));
    }

    #[test]
    fn test_type_field_maps_to_kind() {
        let json = r#"{"id": 3, "name": "Biryani", "type": "main", "price": 12.5}"#;
        let parsed: FavoriteItem = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind.as_deref(), Some("main"));
        assert_eq!(parsed.price, Some(Decimal::new(125, 1)));
    }
}
