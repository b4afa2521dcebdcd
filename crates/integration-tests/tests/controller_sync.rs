//! Cart controller mirroring into the mock cart API over HTTP.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use storecart_core::{Cart, LineItem, Price, ProductId};
use storecart_integration_tests::{ApiCall, MockCartApi};
use storecart_storefront::{
    CartController, CartStore, FileStorage, Headless, HttpRemoteCart, LocalStorage,
    MemoryStorage, Mutation, RemoteApiConfig, Session, SyncReport,
};

fn pid(id: i32) -> ProductId {
    ProductId::new(id)
}

fn item(id: i32, cents: i64, quantity: u32) -> LineItem {
    LineItem::new(
        pid(id),
        format!("Product {id}"),
        Price::from_cents(cents).unwrap(),
        "",
        quantity,
    )
}

fn controller<S: LocalStorage>(
    storage: S,
    config: &RemoteApiConfig,
) -> CartController<S, HttpRemoteCart, Headless> {
    CartController::new(
        CartStore::new(storage),
        HttpRemoteCart::new(config).unwrap(),
        Headless,
        Session::from_config(config),
    )
}

#[tokio::test]
async fn test_login_pushes_local_cart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local_storage.json");
    let api = MockCartApi::start_authenticated().await.unwrap();

    // Browsing anonymously
    let guest = controller(FileStorage::new(&path), &api.anonymous_config());
    let _ = guest.load();
    assert_eq!(guest.sync_all_to_remote().await, SyncReport::NotAuthenticated);
    assert_eq!(guest.add_item(item(1, 1000, 2)).await, Mutation::Applied);
    assert_eq!(guest.add_item(item(2, 599, 1)).await, Mutation::Applied);
    assert!(api.calls().is_empty());

    // Next page load after logging in
    let member = controller(FileStorage::new(&path), &api.authenticated_config());
    assert_eq!(member.load().len(), 2);
    assert_eq!(
        member.sync_all_to_remote().await,
        SyncReport::Completed { pushed: 2 }
    );

    assert_eq!(api.quantities(), BTreeMap::from([(pid(1), 2), (pid(2), 1)]));
    assert_eq!(
        api.calls(),
        vec![
            ApiCall::Clear,
            ApiCall::Upsert {
                product_id: pid(1),
                quantity: 2
            },
            ApiCall::Upsert {
                product_id: pid(2),
                quantity: 1
            },
        ]
    );
}

#[tokio::test]
async fn test_sync_replaces_stale_remote_lines() {
    let api = MockCartApi::start_authenticated().await.unwrap();
    api.seed(pid(9), 4);
    let storage = MemoryStorage::new();
    CartStore::new(&storage)
        .save(&Cart::from_items(vec![item(1, 1000, 3)]))
        .unwrap();

    let cart = controller(&storage, &api.authenticated_config());
    let _ = cart.load();

    assert_eq!(
        cart.sync_all_to_remote().await,
        SyncReport::Completed { pushed: 1 }
    );
    assert_eq!(api.quantities(), BTreeMap::from([(pid(1), 3)]));
    assert_eq!(cart.sync_all_to_remote().await, SyncReport::AlreadySynced);
    assert_eq!(api.calls().len(), 2);
}

#[tokio::test]
async fn test_sync_stops_at_first_failure() {
    let api = MockCartApi::start_authenticated().await.unwrap();
    let storage = MemoryStorage::new();
    CartStore::new(&storage)
        .save(&Cart::from_items(vec![
            item(1, 1000, 1),
            item(2, 1000, 2),
            item(3, 1000, 3),
        ]))
        .unwrap();
    api.fail_from(2);

    let cart = controller(&storage, &api.authenticated_config());
    let _ = cart.load();

    assert_eq!(
        cart.sync_all_to_remote().await,
        SyncReport::Aborted { pushed: 1 }
    );
    assert_eq!(api.quantities(), BTreeMap::from([(pid(1), 1)]));
    assert_eq!(api.calls().len(), 3);
    assert_eq!(cart.cart().len(), 3);
}

#[tokio::test]
async fn test_mutations_are_mirrored() {
    let api = MockCartApi::start_authenticated().await.unwrap();
    let cart = controller(MemoryStorage::new(), &api.authenticated_config());
    let _ = cart.load();
    assert_eq!(cart.sync_all_to_remote().await, SyncReport::EmptyCart);

    assert!(cart.add_item(item(1, 1000, 2)).await.is_applied());
    assert!(cart.add_item(item(1, 1000, 3)).await.is_applied());
    assert_eq!(api.quantities(), BTreeMap::from([(pid(1), 5)]));

    assert!(cart.set_quantity(pid(1), 7).await.is_applied());
    assert_eq!(api.quantities(), BTreeMap::from([(pid(1), 7)]));

    assert!(cart.set_quantity(pid(1), 0).await.is_applied());
    assert!(api.quantities().is_empty());

    assert!(cart.add_item(item(2, 250, 1)).await.is_applied());
    assert!(cart.clear().await.is_applied());
    assert!(api.quantities().is_empty());

    assert_eq!(
        api.calls(),
        vec![
            ApiCall::Upsert {
                product_id: pid(1),
                quantity: 2
            },
            ApiCall::Upsert {
                product_id: pid(1),
                quantity: 5
            },
            ApiCall::Upsert {
                product_id: pid(1),
                quantity: 7
            },
            ApiCall::Remove(pid(1)),
            ApiCall::Upsert {
                product_id: pid(2),
                quantity: 1
            },
            ApiCall::Clear,
        ]
    );
}

#[tokio::test]
async fn test_remote_outage_keeps_local_cart() {
    let api = MockCartApi::start_authenticated().await.unwrap();
    api.fail_from(0);
    let cart = controller(MemoryStorage::new(), &api.authenticated_config());
    let _ = cart.load();

    assert_eq!(cart.add_item(item(1, 1299, 2)).await, Mutation::Applied);

    let local = cart.cart();
    assert_eq!(local.get(pid(1)).unwrap().quantity, 2);
    assert_eq!(cart.recompute_summary().subtotal_display(), "$25.98");
    assert!(api.quantities().is_empty());
    assert_eq!(api.calls().len(), 1);
}
