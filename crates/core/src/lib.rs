//! Storecart Core - Shared cart types.
//!
//! This crate provides the cart model used by every Storecart component:
//! - `storefront` - Cart controller, local storage and remote cart client
//! - `cli` - Command-line driver for the controller
//!
//! # Architecture
//!
//! The core crate contains only types and pure cart arithmetic - no I/O, no
//! storage access, no HTTP clients. Everything here can be unit tested
//! without a runtime.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, line items, the cart itself, the order
//!   summary and the counter badge

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
