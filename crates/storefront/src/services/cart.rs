//! Cart state.
//!
//! The cart lives in memory and is written through to the durable store on
//! every mutation. The total item count is published on a `watch` channel for
//! the header badge.

use std::collections::HashMap;

use medicare_core::Price;
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::models::{CartItem, CartLine, IdentityKey};
use crate::storage::{Repository, RepositoryError, keys};

/// Owns the cart lines and keeps them in sync with storage.
#[derive(Debug)]
pub struct CartManager {
    repo: Repository,
    lines: Vec<CartLine>,
    count: watch::Sender<u32>,
}

impl CartManager {
    /// Hydrate the cart from storage.
    ///
    /// A missing or unreadable cart starts empty, and a line that cannot be
    /// read is dropped without losing the others. Lines with a zero quantity
    /// count as one, and lines sharing an identity key are merged into the
    /// first of them.
    #[must_use]
    pub fn load(repo: Repository) -> Self {
        let stored: Vec<Value> = repo.load_or_default(keys::CART);
        let lines = normalize(decode_lines(stored));
        let (count, _) = watch::channel(sum_quantities(&lines));

        debug!(lines = lines.len(), count = *count.borrow(), "Cart loaded");

        Self { repo, lines, count }
    }

    /// Add one unit of `item`.
    ///
    /// Increments the matching line, or appends a new line after the existing
    /// ones. Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted; the in-memory cart is
    /// left unchanged.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub fn add_or_increment(&mut self, item: CartItem) -> Result<u32, RepositoryError> {
        let key = item.identity();
        let mut next = self.lines.clone();

        let quantity = match next.iter_mut().find(|line| line.identity() == key) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(1);
                line.quantity
            }
            None => {
                next.push(item.into_line());
                1
            }
        };

        self.commit(next)?;
        debug!(quantity, count = self.total_count(), "Added to cart");
        Ok(quantity)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the empty cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<(), RepositoryError> {
        self.commit(Vec::new())
    }

    /// Total number of items across all lines.
    #[must_use]
    pub fn total_count(&self) -> u32 {
        sum_quantities(&self.lines)
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        Price::new(
            self.lines
                .iter()
                .map(|line| line.line_total().amount())
                .sum::<Decimal>(),
        )
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Subscribe to total count changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.count.subscribe()
    }

    /// Persist `next`, then make it current.
    fn commit(&mut self, next: Vec<CartLine>) -> Result<(), RepositoryError> {
        self.repo.save(keys::CART, &next)?;

        let count = sum_quantities(&next);
        self.lines = next;

        // Derived from the cart; a stale value is corrected on the next write.
        if let Err(e) = self.repo.save_text(keys::CART_COUNT, &count.to_string()) {
            warn!(error = %e, "Failed to persist cart count");
        }
        self.count.send_replace(count);
        Ok(())
    }
}

fn sum_quantities(lines: &[CartLine]) -> u32 {
    lines
        .iter()
        .fold(0_u32, |total, line| total.saturating_add(line.quantity))
}

fn decode_lines(stored: Vec<Value>) -> Vec<CartLine> {
    stored
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(line) => Some(line),
            Err(e) => {
                warn!(index, error = %e, "Dropping unreadable stored cart line");
                None
            }
        })
        .collect()
}

fn normalize(stored: Vec<CartLine>) -> Vec<CartLine> {
    let mut positions: HashMap<IdentityKey, usize> = HashMap::new();
    let mut lines: Vec<CartLine> = Vec::with_capacity(stored.len());

    for mut line in stored {
        if line.quantity == 0 {
            warn!(product_id = %line.id, "Stored cart line had zero quantity");
            line.quantity = 1;
        }
        let key = line.identity();
        if let Some(existing) = positions.get(&key).and_then(|&i| lines.get_mut(i)) {
            warn!(product_id = %line.id, "Merging duplicate stored cart line");
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            positions.insert(key, lines.len());
            lines.push(line);
        }
    }

    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use medicare_core::ProductId;
    use serde_json::json;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore, StorageError};

    fn item(id: i64, price: i64) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::new(Decimal::new(price, 0)),
            original_price: None,
            image: None,
            variant: None,
            size: None,
            prescription_required: false,
        }
    }

    #[test]
    fn test_repeat_add_increments() {
        let mut cart = CartManager::load(Repository::in_memory());
        cart.add_or_increment(item(1, 10)).unwrap();
        let quantity = cart.add_or_increment(item(1, 10)).unwrap();

        assert_eq!(quantity, 2);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_count(), 2);

        cart.add_or_increment(item(2, 5)).unwrap();
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total_count(), 3);
        assert_eq!(cart.lines()[0].id, ProductId::new(1));
        assert_eq!(cart.lines()[1].quantity, 1);
        assert_eq!(cart.subtotal(), Price::new(Decimal::new(25, 0)));
    }

    #[test]
    fn test_distinct_keys_make_distinct_lines() {
        let mut cart = CartManager::load(Repository::in_memory());
        for variant in ["30 tablets", "60 tablets", "90 tablets"] {
            let mut item = item(4, 100);
            item.variant = Some(variant.to_string());
            cart.add_or_increment(item).unwrap();
        }
        assert_eq!(cart.lines().len(), 3);
        assert_eq!(cart.total_count(), 3);
    }

    #[test]
    fn test_add_persists_cart_and_count() {
        let repo = Repository::in_memory();
        let mut cart = CartManager::load(repo.clone());
        cart.add_or_increment(item(1, 10)).unwrap();
        cart.add_or_increment(item(1, 10)).unwrap();

        let stored: Vec<CartLine> = repo.load(keys::CART).unwrap().unwrap();
        assert_eq!(stored, cart.lines());
        assert_eq!(repo.load_text(keys::CART_COUNT).unwrap().as_deref(), Some("2"));

        let reloaded = CartManager::load(repo);
        assert_eq!(reloaded.lines(), cart.lines());
    }

    #[test]
    fn test_load_degrades_on_malformed_cart() {
        let repo = Repository::in_memory();
        repo.save_text(keys::CART, "{not json").unwrap();
        assert!(CartManager::load(repo.clone()).is_empty());

        repo.save(keys::CART, &json!({"id": 1})).unwrap();
        assert!(CartManager::load(repo).is_empty());
    }

    #[test]
    fn test_load_normalizes_lines() {
        let repo = Repository::in_memory();
        repo.save(
            keys::CART,
            &json!([
                {"id": 1, "name": "A", "price": 10, "quantity": 0},
                {"id": 2, "name": "B", "price": 5, "quantity": 2},
                {"id": 1, "name": "A", "price": 10, "quantity": 3}
            ]),
        )
        .unwrap();

        let cart = CartManager::load(repo);
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 4);
        assert_eq!(cart.lines()[1].quantity, 2);
        assert_eq!(cart.total_count(), 6);
    }

    #[test]
    fn test_unreadable_line_keeps_the_rest() {
        let repo = Repository::in_memory();
        repo.save(
            keys::CART,
            &json!([
                {"id": 1, "name": "A", "price": 10, "quantity": 2},
                {"id": "7", "name": "B", "price": null, "quantity": 1}
            ]),
        )
        .unwrap();

        let mut cart = CartManager::load(repo.clone());
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].id, ProductId::new(1));
        assert_eq!(cart.total_count(), 2);

        cart.add_or_increment(item(1, 10)).unwrap();
        let stored: Vec<CartLine> = repo.load(keys::CART).unwrap().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].quantity, 3);
    }

    #[test]
    fn test_clear_persists_empty_cart() {
        let repo = Repository::in_memory();
        let mut cart = CartManager::load(repo.clone());
        cart.add_or_increment(item(1, 10)).unwrap();
        cart.clear().unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.total_count(), 0);
        assert!(CartManager::load(repo).is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_new_count() {
        let mut cart = CartManager::load(Repository::in_memory());
        let mut badge = cart.subscribe();
        assert_eq!(*badge.borrow(), 0);

        cart.add_or_increment(item(1, 10)).unwrap();
        badge.changed().await.unwrap();
        assert_eq!(*badge.borrow_and_update(), 1);
    }

    /// Store that refuses writes to one key.
    struct FailingStore {
        inner: MemoryStore,
        fail_key: &'static str,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == self.fail_key {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_write_leaves_cart_unchanged() {
        let repo = Repository::new(Arc::new(FailingStore {
            inner: MemoryStore::new(),
            fail_key: keys::CART,
        }));
        let mut cart = CartManager::load(repo);

        assert!(cart.add_or_increment(item(1, 10)).is_err());
        assert!(cart.is_empty());
        assert_eq!(*cart.subscribe().borrow(), 0);
    }

    #[test]
    fn test_failed_count_write_is_not_fatal() {
        let repo = Repository::new(Arc::new(FailingStore {
            inner: MemoryStore::new(),
            fail_key: keys::CART_COUNT,
        }));
        let mut cart = CartManager::load(repo);

        assert_eq!(cart.add_or_increment(item(1, 10)).unwrap(), 1);
        assert_eq!(cart.total_count(), 1);
    }
}
