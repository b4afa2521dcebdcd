//! Cart controller.
//!
//! Owns the local cart for one page session and keeps three things in step
//! with it: local storage, the presentation layer and, for logged-in users,
//! the server-side cart.
//!
//! # Flow
//!
//! Every mutation runs the same sequence:
//! 1. Take the busy flag (or drop the request if another mutation holds it)
//! 2. Read the stored cart and apply the change
//! 3. Persist the whole cart
//! 4. Refresh the view
//! 5. Mirror the change remotely when the session is authenticated
//!
//! The local write is committed before the remote call. A remote failure is
//! logged and otherwise ignored; the next full sync repairs the divergence.

use std::sync::atomic::{AtomicBool, Ordering};

use storecart_core::{Cart, CounterBadge, LineItem, OrderSummary, ProductId};
use tracing::{debug, error, info, instrument, warn};

use crate::config::RemoteApiConfig;
use crate::remote::RemoteCart;
use crate::storage::{CartStore, LocalStorage, StorageError};
use crate::view::{CartView, Notice};

/// Whether the current user is logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Session {
    Anonymous,
    Authenticated,
}

impl Session {
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Session implied by remote API configuration.
    #[must_use]
    pub const fn from_config(config: &RemoteApiConfig) -> Self {
        if config.is_authenticated() {
            Self::Authenticated
        } else {
            Self::Anonymous
        }
    }
}

/// Outcome of a mutating operation.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    /// The change was committed locally.
    Applied,
    /// Another mutation was in flight; nothing happened.
    Busy,
    /// The product is not in the cart; nothing happened.
    Missing,
    /// Local storage failed. The user has been notified.
    Failed,
}

impl Mutation {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Direction of a quantity stepper button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantityStep {
    Increase,
    Decrease,
}

/// Outcome of [`CartController::sync_all_to_remote`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncReport {
    /// Anonymous session; the remote was not touched.
    NotAuthenticated,
    /// This controller already ran its page-load sync.
    AlreadySynced,
    /// A mutation was in flight.
    Busy,
    /// Local cart is empty; the remote was left as is.
    EmptyCart,
    /// Remote cleared and every local line pushed.
    Completed { pushed: usize },
    /// A remote call failed after `pushed` lines were applied. Nothing was
    /// rolled back.
    Aborted { pushed: usize },
}

/// Clears the busy flag when dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Cart controller for one page session.
///
/// Operations take `&self`, so a front end can hold one controller and
/// dispatch overlapping user events to it; the busy flag keeps at most one
/// mutation in flight.
pub struct CartController<S, R, V> {
    store: CartStore<S>,
    remote: R,
    view: V,
    session: Session,
    busy: AtomicBool,
    synced: AtomicBool,
}

impl<S, R, V> CartController<S, R, V>
where
    S: LocalStorage,
    R: RemoteCart,
    V: CartView,
{
    /// Create a controller. Call [`load`](Self::load) before anything else.
    pub const fn new(store: CartStore<S>, remote: R, view: V, session: Session) -> Self {
        Self {
            store,
            remote,
            view,
            session,
            busy: AtomicBool::new(false),
            synced: AtomicBool::new(false),
        }
    }

    pub const fn store(&self) -> &CartStore<S> {
        &self.store
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    pub const fn view(&self) -> &V {
        &self.view
    }

    pub const fn session(&self) -> Session {
        self.session
    }

    /// Whether a mutation is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| BusyGuard(&self.busy))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Read the persisted cart, creating an empty one if none exists.
    ///
    /// Never fails: unreadable or malformed data is logged and treated as an
    /// empty cart. Refreshes the counter badge.
    #[instrument(skip(self), fields(key = %self.store.key()))]
    pub fn load(&self) -> Cart {
        let cart = match self.store.load() {
            Ok(Some(cart)) => cart,
            Ok(None) => {
                let cart = Cart::new();
                match self.store.save(&cart) {
                    Ok(()) => info!("Initialized empty cart"),
                    Err(e) => warn!(error = %e, "Failed to initialize empty cart"),
                }
                cart
            }
            Err(e) => {
                warn!(error = %e, "Stored cart unreadable, treating as empty");
                Cart::new()
            }
        };
        self.view.render_counter(&cart.badge());
        cart
    }

    /// Snapshot of the current local cart.
    pub fn cart(&self) -> Cart {
        match self.store.load() {
            Ok(cart) => cart.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Stored cart unreadable, treating as empty");
                Cart::new()
            }
        }
    }

    /// Total units in the cart.
    pub fn item_count(&self) -> u64 {
        self.cart().item_count()
    }

    /// Counter badge for the current cart.
    pub fn badge(&self) -> CounterBadge {
        self.cart().badge()
    }

    /// Subtotal, shipping and total of the current local cart.
    pub fn recompute_summary(&self) -> OrderSummary {
        self.cart().summary()
    }

    /// Cart to mutate. Malformed data is replaced by an empty cart; a
    /// backend that cannot be read at all is an error.
    fn cart_for_update(&self) -> Result<Cart, StorageError> {
        match self.store.load() {
            Ok(cart) => Ok(cart.unwrap_or_default()),
            Err(StorageError::Malformed(e)) => {
                warn!(error = %e, "Discarding malformed stored cart");
                Ok(Cart::new())
            }
            Err(e) => Err(e),
        }
    }

    fn fail(&self, error: &StorageError, message: &str) -> Mutation {
        error!(error = %error, "{message}");
        self.view.notify(&Notice::error(message));
        Mutation::Failed
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add an item, merging its quantity into an existing line.
    ///
    /// Logged-in sessions then upsert the product's resulting total quantity
    /// remotely.
    #[instrument(skip(self, item), fields(product_id = %item.product_id, quantity = item.quantity))]
    pub async fn add_item(&self, item: LineItem) -> Mutation {
        let Some(_guard) = self.try_begin() else {
            debug!("Cart busy, dropping add");
            return Mutation::Busy;
        };

        let product_id = item.product_id;
        let name = item.name.clone();

        let mut cart = match self.cart_for_update() {
            Ok(cart) => cart,
            Err(e) => return self.fail(&e, "Failed to add item to cart"),
        };
        let total = cart.add(item);
        if total == u32::MAX {
            warn!(%product_id, "Quantity capped at maximum");
        }
        if let Err(e) = self.store.save(&cart) {
            return self.fail(&e, "Failed to add item to cart");
        }
        info!(total, "Added to cart");

        self.view.render_counter(&cart.badge());
        self.view
            .notify(&Notice::success(format!("\"{name}\" added to cart!")));

        if self.session.is_authenticated() {
            self.mirror_upsert(product_id, total).await;
        }
        Mutation::Applied
    }

    /// Remove a product's line. No-op if it is not in the cart.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, product_id: ProductId) -> Mutation {
        let Some(_guard) = self.try_begin() else {
            debug!("Cart busy, dropping remove");
            return Mutation::Busy;
        };
        self.remove_held(product_id).await
    }

    async fn remove_held(&self, product_id: ProductId) -> Mutation {
        let mut cart = match self.cart_for_update() {
            Ok(cart) => cart,
            Err(e) => return self.fail(&e, "Failed to remove item"),
        };
        if cart.remove(product_id).is_none() {
            info!(%product_id, "Item not in cart");
            return Mutation::Missing;
        }
        if let Err(e) = self.store.save(&cart) {
            return self.fail(&e, "Failed to remove item");
        }
        info!(%product_id, remaining = cart.len(), "Removed from cart");

        self.view.render_counter(&cart.badge());

        if self.session.is_authenticated() {
            if let Err(e) = self.remote.remove(product_id).await {
                warn!(error = %e, %product_id, "Remote remove failed");
            }
        }

        self.view.notify(&Notice::success("Item removed from cart"));
        if cart.is_empty() {
            self.view.render_empty_cart();
            self.view.render_summary(&OrderSummary::zero());
        } else {
            self.view.remove_row(product_id);
            self.view.render_summary(&cart.summary());
        }
        Mutation::Applied
    }

    /// Overwrite a product's quantity. Zero or below removes the line.
    #[instrument(skip(self))]
    pub async fn set_quantity(&self, product_id: ProductId, quantity: i64) -> Mutation {
        let Some(_guard) = self.try_begin() else {
            debug!("Cart busy, dropping quantity update");
            return Mutation::Busy;
        };
        self.set_quantity_held(product_id, quantity).await
    }

    async fn set_quantity_held(&self, product_id: ProductId, quantity: i64) -> Mutation {
        if quantity <= 0 {
            return self.remove_held(product_id).await;
        }
        let quantity = u32::try_from(quantity).unwrap_or_else(|_| {
            warn!(%product_id, requested = quantity, "Quantity capped at maximum");
            u32::MAX
        });

        let mut cart = match self.cart_for_update() {
            Ok(cart) => cart,
            Err(e) => return self.fail(&e, "Failed to update quantity"),
        };
        if cart.set_quantity(product_id, quantity).is_none() {
            info!(%product_id, "Item not in cart");
            return Mutation::Missing;
        }
        if let Err(e) = self.store.save(&cart) {
            return self.fail(&e, "Failed to update quantity");
        }
        info!(%product_id, quantity, "Updated quantity");

        self.view.render_counter(&cart.badge());

        if self.session.is_authenticated() {
            self.mirror_upsert(product_id, quantity).await;
        }

        if let Some(item) = cart.get(product_id) {
            self.view
                .update_row(product_id, item.quantity, item.line_total());
        }
        self.view.render_summary(&cart.summary());
        Mutation::Applied
    }

    /// Apply a stepper button: one more, or one fewer but never below one.
    #[instrument(skip(self))]
    pub async fn step_quantity(&self, product_id: ProductId, step: QuantityStep) -> Mutation {
        let Some(_guard) = self.try_begin() else {
            debug!("Cart busy, dropping quantity step");
            return Mutation::Busy;
        };

        let cart = match self.cart_for_update() {
            Ok(cart) => cart,
            Err(e) => return self.fail(&e, "Failed to update quantity"),
        };
        let Some(current) = cart.get(product_id).map(|item| item.quantity) else {
            info!(%product_id, "Item not in cart");
            return Mutation::Missing;
        };
        let next = match step {
            QuantityStep::Increase => current.saturating_add(1),
            QuantityStep::Decrease => current.saturating_sub(1).max(1),
        };
        debug!(current, next, "Stepping quantity");
        self.set_quantity_held(product_id, i64::from(next)).await
    }

    /// Empty the cart locally and, for logged-in sessions, remotely.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Mutation {
        let Some(_guard) = self.try_begin() else {
            debug!("Cart busy, dropping clear");
            return Mutation::Busy;
        };

        let cart = Cart::new();
        if let Err(e) = self.store.save(&cart) {
            return self.fail(&e, "Failed to clear cart");
        }
        info!("Cleared cart");

        self.view.render_counter(&cart.badge());

        if self.session.is_authenticated() {
            if let Err(e) = self.remote.clear().await {
                warn!(error = %e, "Remote clear failed");
            }
        }

        self.view.notify(&Notice::success("Cart cleared"));
        self.view.render_empty_cart();
        self.view.render_summary(&OrderSummary::zero());
        Mutation::Applied
    }

    async fn mirror_upsert(&self, product_id: ProductId, quantity: u32) {
        if let Err(e) = self.remote.upsert(product_id, quantity).await {
            warn!(error = %e, %product_id, quantity, "Remote upsert failed");
        }
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Replace the remote cart with the local one.
    ///
    /// Runs once per controller and only for logged-in sessions. Clears the
    /// remote, then upserts each local line in order with its local
    /// quantity. Stops at the first failure without undoing what was
    /// already applied.
    #[instrument(skip(self))]
    pub async fn sync_all_to_remote(&self) -> SyncReport {
        if !self.session.is_authenticated() {
            return SyncReport::NotAuthenticated;
        }
        let Some(_guard) = self.try_begin() else {
            debug!("Cart busy, skipping sync");
            return SyncReport::Busy;
        };
        if self.synced.swap(true, Ordering::AcqRel) {
            return SyncReport::AlreadySynced;
        }

        let cart = self.cart();
        if cart.is_empty() {
            debug!("Local cart empty, nothing to sync");
            return SyncReport::EmptyCart;
        }

        info!(lines = cart.len(), "Syncing local cart to remote");
        if let Err(e) = self.remote.clear().await {
            warn!(error = %e, "Sync aborted: remote clear failed");
            return SyncReport::Aborted { pushed: 0 };
        }

        let mut pushed = 0;
        for item in &cart {
            if let Err(e) = self.remote.upsert(item.product_id, item.quantity).await {
                warn!(
                    error = %e,
                    product_id = %item.product_id,
                    pushed,
                    "Sync aborted: remote upsert failed"
                );
                return SyncReport::Aborted { pushed };
            }
            pushed += 1;
        }

        info!(pushed, "Local cart synced to remote");
        SyncReport::Completed { pushed }
    }
}
