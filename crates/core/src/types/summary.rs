//! Order summary: subtotal, shipping and total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::line_item::LineItem;
use super::price::format_money;

/// Orders with a subtotal strictly above this ship free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Flat shipping charged at or below the threshold ($5.99).
pub const FLAT_SHIPPING_RATE: Decimal = Decimal::from_parts(599, 0, 0, false, 2);

/// Totals shown in the cart page summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl OrderSummary {
    /// Compute the summary for a set of line items.
    ///
    /// Pure: the same items always yield the same summary.
    #[must_use]
    pub fn for_items<'a>(items: impl IntoIterator<Item = &'a LineItem>) -> Self {
        let subtotal: Decimal = items.into_iter().map(LineItem::line_total).sum();
        let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            FLAT_SHIPPING_RATE
        };
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }

    /// All-zero summary rendered when the cart has been emptied.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            shipping: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn subtotal_display(&self) -> String {
        format_money(self.subtotal)
    }

    /// Shipping label; free shipping shows as `FREE`.
    #[must_use]
    pub fn shipping_display(&self) -> String {
        if self.shipping.is_zero() {
            "FREE".to_string()
        } else {
            format_money(self.shipping)
        }
    }

    #[must_use]
    pub fn total_display(&self) -> String {
        format_money(self.total)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::id::ProductId;
    use crate::types::price::Price;

    fn item(cents: i64, quantity: u32) -> LineItem {
        LineItem::new(
            ProductId::new(1),
            "Widget",
            Price::from_cents(cents).unwrap(),
            "",
            quantity,
        )
    }

    #[test]
    fn test_constants() {
        assert_eq!(FREE_SHIPPING_THRESHOLD, Decimal::new(50, 0));
        assert_eq!(FLAT_SHIPPING_RATE, Decimal::new(599, 2));
    }

    #[test]
    fn test_below_threshold_pays_shipping() {
        let items = [item(1000, 2)];
        let summary = OrderSummary::for_items(&items);
        assert_eq!(summary.subtotal, Decimal::new(20, 0));
        assert_eq!(summary.shipping, Decimal::new(599, 2));
        assert_eq!(summary.total, Decimal::new(2599, 2));
        assert_eq!(summary.total_display(), "$25.99");
    }

    #[test]
    fn test_above_threshold_ships_free() {
        let items = [item(1000, 6)];
        let summary = OrderSummary::for_items(&items);
        assert_eq!(summary.subtotal, Decimal::new(60, 0));
        assert_eq!(summary.shipping, Decimal::ZERO);
        assert_eq!(summary.total, Decimal::new(60, 0));
        assert_eq!(summary.shipping_display(), "FREE");
    }

    #[test]
    fn test_exactly_threshold_pays_shipping() {
        let items = [item(1000, 5)];
        let summary = OrderSummary::for_items(&items);
        assert_eq!(summary.shipping, FLAT_SHIPPING_RATE);
    }

    #[test]
    fn test_pure() {
        let items = [item(1999, 3), item(250, 1)];
        assert_eq!(
            OrderSummary::for_items(&items),
            OrderSummary::for_items(&items)
        );
    }

    #[test]
    fn test_empty_items_still_charge_shipping() {
        let summary = OrderSummary::for_items(&[]);
        assert_eq!(summary.subtotal, Decimal::ZERO);
        assert_eq!(summary.shipping, FLAT_SHIPPING_RATE);
    }

    #[test]
    fn test_zero_summary_displays() {
        let summary = OrderSummary::zero();
        assert_eq!(summary.subtotal_display(), "$0.00");
        assert_eq!(summary.shipping_display(), "FREE");
        assert_eq!(summary.total_display(), "$0.00");
    }
}
