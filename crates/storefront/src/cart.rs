//! Session-local shopping cart.
//!
//! The cart is the only mutable state the storefront owns outright: it is
//! never persisted remotely until submission. All mutations go through the
//! store's methods, which derive the next state from the latest state
//! under an internal lock and republish a full snapshot to observers, so
//! two overlapping mutations can never race on a stale read.

use std::sync::Mutex;

use tokio::sync::watch;

use green_basket_core::{CartItem, DEFAULT_MIN_ORDER, MAX_LINE_QUANTITY, Rupees, cart_total};

/// In-memory cart state machine. No I/O, no failure modes: every input is
/// sanitized to a safe default and out-of-range mutations are silently
/// rejected.
pub struct CartStore {
    items: Mutex<Vec<CartItem>>,
    snapshots: watch::Sender<Vec<CartItem>>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(Vec::new());
        Self {
            items: Mutex::new(Vec::new()),
            snapshots,
        }
    }

    /// Add a catalog item to the cart.
    ///
    /// If a line with the same `sku` already exists its quantity grows by
    /// the candidate's minimum order (the re-add increment); otherwise a
    /// new line is inserted at the candidate's minimum order, regardless
    /// of any quantity the candidate arrived with. Duplicate `sku` lines
    /// cannot occur.
    pub fn add_item(&self, candidate: CartItem) {
        self.mutate(|items| {
            let increment = sanitize_min_order(candidate.min_order);
            if let Some(existing) = items.iter_mut().find(|item| item.sku == candidate.sku) {
                existing.quantity = existing.quantity.saturating_add(increment);
            } else {
                let mut item = candidate;
                item.min_order = increment;
                item.quantity = increment;
                if item.price_per_kg < Rupees::ZERO {
                    item.price_per_kg = Rupees::ZERO;
                }
                items.push(item);
            }
        });
    }

    /// Nudge a line's quantity by `delta`.
    ///
    /// The mutation applies only when the resulting quantity stays at or
    /// above the line's minimum order; otherwise it is silently rejected
    /// with no partial change. This is a floor, not a clamp.
    pub fn update_quantity(&self, sku: &str, delta: i64) {
        self.mutate(|items| {
            if let Some(item) = items.iter_mut().find(|item| item.sku == sku) {
                let next = i64::from(item.quantity) + delta;
                if next >= i64::from(item.min_order) {
                    if let Ok(quantity) = u32::try_from(next) {
                        item.quantity = quantity;
                    }
                }
            }
        });
    }

    /// Set a line's quantity to an absolute value, clamped to
    /// `[min_order, 50_000]`. Used when the buyer types a number directly.
    pub fn set_quantity(&self, sku: &str, requested: u32) {
        self.mutate(|items| {
            if let Some(item) = items.iter_mut().find(|item| item.sku == sku) {
                item.quantity = requested.clamp(item.min_order, MAX_LINE_QUANTITY);
            }
        });
    }

    /// Remove a line. No-op when the sku is absent.
    pub fn remove_item(&self, sku: &str) {
        self.mutate(|items| {
            items.retain(|item| item.sku != sku);
        });
    }

    /// Empty the cart. Called by the UI after a successful submission
    /// acknowledgment; submission itself never clears the cart.
    pub fn clear(&self) {
        self.mutate(Vec::clear);
    }

    /// Current lines, in stable insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock().clone()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sum of `price_per_kg * quantity` over all lines, recomputed from
    /// the current state on every call.
    #[must_use]
    pub fn total(&self) -> Rupees {
        cart_total(&self.lock())
    }

    /// Observe full cart snapshots; one value per committed mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartItem>> {
        self.snapshots.subscribe()
    }

    fn mutate(&self, apply: impl FnOnce(&mut Vec<CartItem>)) {
        let mut items = self.lock();
        apply(&mut items);
        self.snapshots.send_replace(items.clone());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CartItem>> {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A zero minimum order is meaningless; fall back to the default.
const fn sanitize_min_order(min_order: u32) -> u32 {
    if min_order == 0 {
        DEFAULT_MIN_ORDER
    } else {
        min_order
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(sku: &str, price: i64, min_order: u32) -> CartItem {
        CartItem {
            sku: sku.to_owned(),
            name: sku.to_owned(),
            indian_name: None,
            price_per_kg: Rupees::from_whole(price),
            unit: "kg".to_owned(),
            min_order,
            quantity: 0,
            image_url: None,
            stock: None,
        }
    }

    #[test]
    fn test_add_inserts_at_min_order() {
        let cart = CartStore::new();
        cart.add_item(item("tomato", 20, 10));

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().quantity, 10);
    }

    #[test]
    fn test_add_same_sku_increments_instead_of_duplicating() {
        let cart = CartStore::new();
        cart.add_item(item("tomato", 20, 10));
        cart.add_item(item("tomato", 20, 10));

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().quantity, 20);
    }

    #[test]
    fn test_add_sanitizes_zero_min_order() {
        let cart = CartStore::new();
        cart.add_item(item("okra", 30, 0));

        let line = cart.items().first().cloned().unwrap();
        assert_eq!(line.min_order, DEFAULT_MIN_ORDER);
        assert_eq!(line.quantity, DEFAULT_MIN_ORDER);
    }

    #[test]
    fn test_update_below_floor_is_rejected_without_partial_change() {
        let cart = CartStore::new();
        cart.add_item(item("tomato", 20, 10));

        cart.update_quantity("tomato", -5);
        assert_eq!(cart.items().first().unwrap().quantity, 10);

        cart.update_quantity("tomato", 5);
        assert_eq!(cart.items().first().unwrap().quantity, 15);
        cart.update_quantity("tomato", -5);
        assert_eq!(cart.items().first().unwrap().quantity, 10);
    }

    #[test]
    fn test_update_unknown_sku_is_a_noop() {
        let cart = CartStore::new();
        cart.add_item(item("tomato", 20, 10));
        cart.update_quantity("onion", 10);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_set_quantity_clamps_both_ends() {
        let cart = CartStore::new();
        cart.add_item(item("tomato", 20, 10));

        cart.set_quantity("tomato", 3);
        assert_eq!(cart.items().first().unwrap().quantity, 10);

        cart.set_quantity("tomato", 80_000);
        assert_eq!(cart.items().first().unwrap().quantity, MAX_LINE_QUANTITY);

        cart.set_quantity("tomato", 25);
        assert_eq!(cart.items().first().unwrap().quantity, 25);
    }

    #[test]
    fn test_remove_then_remove_again() {
        let cart = CartStore::new();
        cart.add_item(item("tomato", 20, 10));
        cart.remove_item("tomato");
        assert!(cart.is_empty());
        // Absent sku: no-op.
        cart.remove_item("tomato");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_is_pure_function_of_state() {
        let cart = CartStore::new();
        cart.add_item(item("tomato", 20, 10));
        cart.add_item(item("onion", 15, 10));
        cart.set_quantity("onion", 20);
        assert_eq!(cart.total(), Rupees::from_whole(500));

        cart.update_quantity("tomato", -5); // rejected
        assert_eq!(cart.total(), Rupees::from_whole(500));

        cart.remove_item("onion");
        assert_eq!(cart.total(), Rupees::from_whole(200));

        cart.clear();
        assert_eq!(cart.total(), Rupees::ZERO);
    }

    #[test]
    fn test_min_order_holds_after_every_operation() {
        let cart = CartStore::new();
        cart.add_item(item("tomato", 20, 10));
        cart.add_item(item("okra", 30, 25));
        cart.update_quantity("tomato", 7);
        cart.update_quantity("okra", -30);
        cart.set_quantity("tomato", 1);
        cart.set_quantity("okra", 60_000);
        cart.add_item(item("tomato", 20, 10));

        for line in cart.items() {
            assert!(
                line.quantity >= line.min_order,
                "{} fell below its floor",
                line.sku
            );
        }
    }

    #[test]
    fn test_subscribers_see_snapshots() {
        let cart = CartStore::new();
        let rx = cart.subscribe();
        cart.add_item(item("tomato", 20, 10));
        assert_eq!(rx.borrow().len(), 1);
        cart.clear();
        assert!(rx.borrow().is_empty());
    }
}
