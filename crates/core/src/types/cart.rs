//! The local cart: an ordered list of line items keyed by product.
//!
//! # Invariants
//!
//! - At most one line item per `ProductId`.
//! - Every line item has `quantity >= 1`; a quantity reaching zero removes
//!   the item.
//!
//! Both hold for any `Cart` built through this module, including carts
//! decoded from storage: [`Cart::from_items`] drops zero-quantity entries and
//! folds duplicate products into their first occurrence.

use serde::{Deserialize, Serialize};

use super::badge::CounterBadge;
use super::id::ProductId;
use super::line_item::LineItem;
use super::summary::OrderSummary;

/// Ordered cart contents.
///
/// Serializes as a bare JSON array of line items, the format kept under the
/// storage key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from raw items, restoring the cart invariants.
    #[must_use]
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match cart.find_mut(item.product_id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line item for a product.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    fn find_mut(&mut self, product_id: ProductId) -> Option<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|item| item.product_id == product_id)
    }

    /// Add an item, merging with an existing line for the same product.
    ///
    /// An existing line keeps its name, price and image; only the quantity
    /// grows. A zero quantity is treated as one.
    ///
    /// Returns the resulting total quantity for the product.
    pub fn add(&mut self, item: LineItem) -> u32 {
        let quantity = item.quantity.max(1);
        if let Some(existing) = self.find_mut(item.product_id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return existing.quantity;
        }
        self.items.push(LineItem { quantity, ..item });
        quantity
    }

    /// Remove the line for a product, returning it if present.
    pub fn remove(&mut self, product_id: ProductId) -> Option<LineItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.product_id == product_id)?;
        Some(self.items.remove(index))
    }

    /// Overwrite a product's quantity (absolute, not a delta).
    ///
    /// A quantity of zero removes the line. Returns `None` when the product
    /// is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> Option<u32> {
        if quantity == 0 {
            return self.remove(product_id).map(|_| 0);
        }
        let item = self.find_mut(product_id)?;
        item.quantity = quantity;
        Some(quantity)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Subtotal, shipping and total for the current contents.
    #[must_use]
    pub fn summary(&self) -> OrderSummary {
        OrderSummary::for_items(&self.items)
    }

    /// Counter badge for the current item count.
    #[must_use]
    pub fn badge(&self) -> CounterBadge {
        CounterBadge::for_count(self.item_count())
    }
}

impl From<Vec<LineItem>> for Cart {
    fn from(items: Vec<LineItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
