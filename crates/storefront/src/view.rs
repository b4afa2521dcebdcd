//! Presentation seam for the cart controller.
//!
//! The controller never renders anything itself. It tells a [`CartView`]
//! what changed: the counter badge, a notification, one row, the order
//! summary, or that the cart is now empty. A browser front end maps these
//! onto DOM elements; the CLI prints them.

use rust_decimal::Decimal;
use storecart_core::{CounterBadge, OrderSummary, ProductId};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Everything the controller can ask the presentation layer to update.
///
/// Rows are addressed by product ID; a view with no row for that product
/// ignores the call.
pub trait CartView {
    /// Redraw the cart counter badge.
    fn render_counter(&self, badge: &CounterBadge);

    /// Show a notification.
    fn notify(&self, notice: &Notice);

    /// Update a row's quantity and line total.
    fn update_row(&self, product_id: ProductId, quantity: u32, line_total: Decimal);

    /// Remove a row from the cart listing.
    fn remove_row(&self, product_id: ProductId);

    /// Redraw the order summary.
    fn render_summary(&self, summary: &OrderSummary);

    /// Replace the listing with the empty-cart state.
    fn render_empty_cart(&self);
}

/// View that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl CartView for Headless {
    fn render_counter(&self, _badge: &CounterBadge) {}
    fn notify(&self, _notice: &Notice) {}
    fn update_row(&self, _product_id: ProductId, _quantity: u32, _line_total: Decimal) {}
    fn remove_row(&self, _product_id: ProductId) {}
    fn render_summary(&self, _summary: &OrderSummary) {}
    fn render_empty_cart(&self) {}
}

impl<T: CartView + ?Sized> CartView for &T {
    fn render_counter(&self, badge: &CounterBadge) {
        (**self).render_counter(badge);
    }

    fn notify(&self, notice: &Notice) {
        (**self).notify(notice);
    }

    fn update_row(&self, product_id: ProductId, quantity: u32, line_total: Decimal) {
        (**self).update_row(product_id, quantity, line_total);
    }

    fn remove_row(&self, product_id: ProductId) {
        (**self).remove_row(product_id);
    }

    fn render_summary(&self, summary: &OrderSummary) {
        (**self).render_summary(summary);
    }

    fn render_empty_cart(&self) {
        (**self).render_empty_cart();
    }
}
