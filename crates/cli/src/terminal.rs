//! Terminal rendering of cart updates.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use rust_decimal::Decimal;
use storecart_core::{Cart, CounterBadge, OrderSummary, ProductId, format_money};
use storecart_storefront::{CartView, Notice, NoticeLevel, RemoteLineItem};

/// Prints every view update as a line of text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalView {
    /// Suppress row/summary output (used for non-listing commands).
    pub quiet: bool,
}

impl TerminalView {
    #[must_use]
    pub const fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Print the full cart listing followed by its summary.
    pub fn print_cart(&self, cart: &Cart) {
        if cart.is_empty() {
            self.render_empty_cart();
            return;
        }
        println!("{:>6}  {:<28} {:>10} {:>5} {:>11}", "ID", "Item", "Price", "Qty", "Total");
        for item in cart {
            println!(
                "{:>6}  {:<28} {:>10} {:>5} {:>11}",
                item.product_id,
                truncate(&item.name, 28),
                item.unit_price.display(),
                item.quantity,
                format_money(item.line_total()),
            );
        }
        print_summary(&cart.summary());
    }

    /// Print the server's copy of the cart.
    pub fn print_remote(&self, lines: &[RemoteLineItem]) {
        if lines.is_empty() {
            println!("Remote cart is empty");
            return;
        }
        for line in lines {
            println!(
                "{:>6}  {:<28} {:>10} {:>5}",
                line.product_id,
                truncate(&line.name, 28),
                line.price.display(),
                line.quantity,
            );
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn print_summary(summary: &OrderSummary) {
    println!(
        "Subtotal {}  Shipping {}  Total {}",
        summary.subtotal_display(),
        summary.shipping_display(),
        summary.total_display()
    );
}

impl CartView for TerminalView {
    fn render_counter(&self, badge: &CounterBadge) {
        match badge.density {
            Some(density) => println!("Cart ({}) [{}]", badge.label, density.css_class()),
            None => println!("Cart (empty)"),
        }
    }

    fn notify(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Success => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("{}", notice.message),
        }
    }

    fn update_row(&self, product_id: ProductId, quantity: u32, line_total: Decimal) {
        if !self.quiet {
            println!(
                "  #{product_id}  Quantity: {quantity}  Total: {}",
                format_money(line_total)
            );
        }
    }

    fn remove_row(&self, product_id: ProductId) {
        if !self.quiet {
            println!("  #{product_id} removed");
        }
    }

    fn render_summary(&self, summary: &OrderSummary) {
        if !self.quiet {
            print_summary(summary);
        }
    }

    fn render_empty_cart(&self) {
        println!("Your cart is empty. Add some products to get started!");
    }
}
