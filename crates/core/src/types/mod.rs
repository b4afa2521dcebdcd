//! Core types for Storecart.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod badge;
pub mod cart;
pub mod id;
pub mod line_item;
pub mod price;
pub mod summary;

pub use badge::{CounterBadge, Density};
pub use cart::Cart;
pub use id::*;
pub use line_item::LineItem;
pub use price::{Price, PriceError, format_money};
pub use summary::{FLAT_SHIPPING_RATE, FREE_SHIPPING_THRESHOLD, OrderSummary};
