//! Storecart storefront library.
//!
//! The cart controller a storefront page drives, plus the collaborators it
//! needs: local storage, the remote cart API client and the presentation
//! seam.
//!
//! # Architecture
//!
//! - [`controller`] - `CartController`, one per page session
//! - [`storage`] - browser-style local storage backends and `CartStore`
//! - [`remote`] - server-side cart mirror over HTTP (`reqwest`)
//! - [`view`] - `CartView` trait standing in for the DOM
//! - [`config`] - environment configuration
//! - [`error`] - unified error type for setup code
//!
//! # Example
//!
//! ```rust,ignore
//! use storecart_storefront::{CartController, CartStore, FileStorage, HttpRemoteCart, Session};
//!
//! let config = StorecartConfig::from_env()?;
//! let store = CartStore::with_key(FileStorage::new(config.storage_path()), &config.storage_key);
//! let remote = HttpRemoteCart::new(&config.api)?;
//! let controller = CartController::new(store, remote, view, Session::from_config(&config.api));
//!
//! controller.load();
//! controller.sync_all_to_remote().await;
//! controller.add_item(item).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod controller;
pub mod error;
pub mod remote;
pub mod storage;
pub mod view;

pub use config::{ConfigError, RemoteApiConfig, StorecartConfig};
pub use controller::{CartController, Mutation, QuantityStep, Session, SyncReport};
pub use error::CartError;
pub use remote::{HttpRemoteCart, Offline, RemoteCart, RemoteError, RemoteLineItem};
pub use storage::{CartStore, FileStorage, LocalStorage, MemoryStorage, StorageError};
pub use view::{CartView, Headless, Notice, NoticeLevel};
