//! Cart commands.
//!
//! Each invocation is one page session: the controller is built, loads the
//! stored cart, runs its one-time remote sync for logged-in users, and then
//! executes the requested command.
//!
//! # Usage
//!
//! ```bash
//! storecart show
//! storecart add 1 "Widget" 10.00 --quantity 2
//! storecart set 1 5
//! storecart decrease 1
//! storecart remove 1
//! storecart sync
//! ```

use storecart_core::{LineItem, Price, ProductId};
use storecart_storefront::{
    CartController, CartError, CartStore, FileStorage, HttpRemoteCart, Mutation, QuantityStep,
    Session, StorecartConfig, SyncReport,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::terminal::TerminalView;

/// Errors surfaced to the CLI user.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error("Not logged in: set STORECART_SESSION_COOKIE to reach the remote cart")]
    NotAuthenticated,
    #[error("Product {0} is not in the cart")]
    Missing(ProductId),
    #[error("Cart operation failed")]
    Failed,
    #[error("Cart is busy")]
    Busy,
    #[error("Remote sync stopped after {0} item(s)")]
    SyncAborted(usize),
}

/// A cart action requested on the command line.
#[derive(Debug, Clone)]
pub enum CartCommand {
    Show,
    Add {
        product_id: ProductId,
        name: String,
        price: Price,
        image_url: String,
        quantity: u32,
    },
    Remove(ProductId),
    Set(ProductId, i64),
    Step(ProductId, QuantityStep),
    Clear,
    Sync,
    Remote,
}

type Controller = CartController<FileStorage, HttpRemoteCart, TerminalView>;

/// Build a controller from configuration.
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built.
pub fn controller(config: &StorecartConfig, quiet: bool) -> Result<Controller, CommandError> {
    let store = CartStore::with_key(
        FileStorage::new(config.storage_path()),
        config.storage_key.clone(),
    );
    let remote = HttpRemoteCart::new(&config.api).map_err(CartError::from)?;
    Ok(CartController::new(
        store,
        remote,
        TerminalView::new(quiet),
        Session::from_config(&config.api),
    ))
}

/// Run one command in a fresh page session.
///
/// # Errors
///
/// Returns error if the command could not be applied.
pub async fn run(config: &StorecartConfig, command: CartCommand) -> Result<(), CommandError> {
    let quiet = matches!(command, CartCommand::Add { .. });
    let controller = controller(config, quiet)?;

    let _ = controller.load();

    // `sync` runs the page-load sync explicitly and reports on it.
    if !matches!(command, CartCommand::Sync) {
        let report = controller.sync_all_to_remote().await;
        info!(?report, "Page-load sync");
    }

    match command {
        CartCommand::Show => {
            controller.view().print_cart(&controller.cart());
            Ok(())
        }
        CartCommand::Add {
            product_id,
            name,
            price,
            image_url,
            quantity,
        } => {
            let item = LineItem::new(product_id, name, price, image_url, quantity);
            check(controller.add_item(item).await, Some(product_id))
        }
        CartCommand::Remove(product_id) => {
            check(controller.remove_item(product_id).await, Some(product_id))
        }
        CartCommand::Set(product_id, quantity) => check(
            controller.set_quantity(product_id, quantity).await,
            Some(product_id),
        ),
        CartCommand::Step(product_id, step) => check(
            controller.step_quantity(product_id, step).await,
            Some(product_id),
        ),
        CartCommand::Clear => check(controller.clear().await, None),
        CartCommand::Sync => sync(&controller).await,
        CartCommand::Remote => {
            if !controller.session().is_authenticated() {
                return Err(CommandError::NotAuthenticated);
            }
            let lines = controller
                .remote()
                .fetch()
                .await
                .map_err(CartError::from)?;
            controller.view().print_remote(&lines);
            Ok(())
        }
    }
}

fn check(outcome: Mutation, product_id: Option<ProductId>) -> Result<(), CommandError> {
    match outcome {
        Mutation::Applied => Ok(()),
        Mutation::Busy => Err(CommandError::Busy),
        Mutation::Missing => Err(product_id.map_or(CommandError::Failed, CommandError::Missing)),
        Mutation::Failed => Err(CommandError::Failed),
    }
}

async fn sync(controller: &Controller) -> Result<(), CommandError> {
    match controller.sync_all_to_remote().await {
        SyncReport::NotAuthenticated => Err(CommandError::NotAuthenticated),
        SyncReport::Busy => Err(CommandError::Busy),
        SyncReport::Aborted { pushed } => Err(CommandError::SyncAborted(pushed)),
        SyncReport::EmptyCart => {
            warn!("Local cart is empty; remote cart left unchanged");
            Ok(())
        }
        SyncReport::AlreadySynced => {
            info!("Remote cart already synced in this session");
            Ok(())
        }
        SyncReport::Completed { pushed } => {
            info!(pushed, "Remote cart replaced with local cart");
            Ok(())
        }
    }
}
