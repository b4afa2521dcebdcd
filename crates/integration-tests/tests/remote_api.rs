//! `HttpRemoteCart` against the mock cart API.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use storecart_core::{Price, ProductId};
use storecart_integration_tests::{ApiCall, MockCartApi};
use storecart_storefront::{HttpRemoteCart, RemoteCart, RemoteError};

fn pid(id: i32) -> ProductId {
    ProductId::new(id)
}

#[tokio::test]
async fn test_upsert_sets_quantity() {
    let api = MockCartApi::start_authenticated().await.unwrap();
    let remote = HttpRemoteCart::new(&api.authenticated_config()).unwrap();

    remote.upsert(pid(1), 2).await.unwrap();
    remote.upsert(pid(1), 5).await.unwrap();
    remote.upsert(pid(2), 1).await.unwrap();

    assert_eq!(api.quantities(), BTreeMap::from([(pid(1), 5), (pid(2), 1)]));
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
                product_id: pid(2),
                quantity: 1
            },
        ]
    );
}

#[tokio::test]
async fn test_remove_and_clear() {
    let api = MockCartApi::start_authenticated().await.unwrap();
    api.seed(pid(1), 1);
    api.seed(pid(2), 3);
    api.seed(pid(3), 2);
    let remote = HttpRemoteCart::new(&api.authenticated_config()).unwrap();

    remote.remove(pid(2)).await.unwrap();
    assert_eq!(api.quantities(), BTreeMap::from([(pid(1), 1), (pid(3), 2)]));

    remote.clear().await.unwrap();
    assert!(api.quantities().is_empty());
    assert_eq!(api.calls(), vec![ApiCall::Remove(pid(2)), ApiCall::Clear]);
}

#[tokio::test]
async fn test_fetch_decodes_lines() {
    let api = MockCartApi::start_authenticated().await.unwrap();
    api.add_product(pid(4), "Blue Mug", "12.50".parse().unwrap());
    api.seed(pid(4), 2);
    let remote = HttpRemoteCart::new(&api.authenticated_config()).unwrap();

    let lines = remote.fetch().await.unwrap();

    assert_eq!(lines.len(), 1);
    let line = lines.first().unwrap();
    assert_eq!(line.product_id, pid(4));
    assert_eq!(line.name, "Blue Mug");
    assert_eq!(line.price, Price::from_cents(1250).unwrap());
    assert_eq!(line.quantity, 2);
    assert_eq!(api.calls(), vec![ApiCall::List]);
}

#[tokio::test]
async fn test_missing_cookie_is_rejected() {
    let api = MockCartApi::start_authenticated().await.unwrap();
    let remote = HttpRemoteCart::new(&api.anonymous_config()).unwrap();

    let err = remote.upsert(pid(1), 1).await.unwrap_err();

    assert!(matches!(err, RemoteError::Status { status: 401, .. }));
    assert!(api.quantities().is_empty());
}

#[tokio::test]
async fn test_server_error_maps_to_status() {
    let api = MockCartApi::start().await.unwrap();
    api.fail_from(0);
    let remote = HttpRemoteCart::new(&api.authenticated_config()).unwrap();

    match remote.upsert(pid(1), 1).await.unwrap_err() {
        RemoteError::Status {
            method,
            path,
            status,
        } => {
            assert_eq!(method, "POST");
            assert_eq!(path, "/api/cart");
            assert_eq!(status, 500);
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = remote.remove(pid(1)).await.unwrap_err();
    assert!(matches!(err, RemoteError::Status { method: "DELETE", status: 500, .. }));
}
