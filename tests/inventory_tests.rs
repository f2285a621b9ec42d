use std::sync::Arc;

use rustbazaar::clock::FixedClock;
use rustbazaar::error::OrderError;
use rustbazaar::models::{AuthContext, DeliveryAddress, Product, Role};
use rustbazaar::services::inventory_service::{self, ReservationItem};
use rustbazaar::services::order_service::{self, CreateOrderRequest, NewOrderItem};
use rustbazaar::store::memory::{InMemoryOrderStore, InMemoryProductStore};
use rustbazaar::{config, AppState};

fn test_state() -> AppState {
    let mut settings = config::load();
    settings.seed_demo_data = false;

    AppState {
        settings,
        orders: Arc::new(InMemoryOrderStore::new()),
        products: Arc::new(InMemoryProductStore::new()),
        clock: Arc::new(FixedClock::new(1_700_000_000)),
    }
}

async fn put_product(state: &AppState, id: &str, seller_id: &str, price: f64, stock: i64) {
    state
        .products
        .put(Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            price,
            stock,
            seller_id: seller_id.to_string(),
            active: true,
            updated_at: 0,
            version: 0,
        })
        .await
        .unwrap();
}

fn buyer(uid: &str) -> AuthContext {
    AuthContext {
        uid: uid.to_string(),
        role: Role::Buyer,
        verification_status: "verified".to_string(),
    }
}

fn order_request(seller_id: &str, product_id: &str, qty: i64) -> CreateOrderRequest {
    CreateOrderRequest {
        seller_id: seller_id.to_string(),
        items: vec![NewOrderItem {
            product_id: product_id.to_string(),
            quantity: qty,
        }],
        payment_method: "CashOnDelivery".to_string(),
        delivery_address: DeliveryAddress {
            street: "12 Lake Road".to_string(),
            city: "Riverton".to_string(),
            phone: "+1 555-0101".to_string(),
        },
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn the_last_unit_is_never_sold_twice() {
    let state = test_state();
    put_product(&state, "p1", "seller-1", 10.0, 1).await;

    let s1 = state.clone();
    let s2 = state.clone();

    let a = tokio::spawn(async move {
        let auth = buyer("buyer-1");
        order_service::create_order(&s1, &auth, order_request("seller-1", "p1", 1)).await
    });
    let b = tokio::spawn(async move {
        let auth = buyer("buyer-2");
        order_service::create_order(&s2, &auth, order_request("seller-1", "p1", 1)).await
    });

    let ra = a.await.unwrap();
    let rb = b.await.unwrap();

    let successes = [ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);

    let err = if ra.is_err() {
        ra.unwrap_err()
    } else {
        rb.unwrap_err()
    };
    assert!(matches!(
        err,
        OrderError::InsufficientStock { .. } | OrderError::Contention
    ));

    let p = state.products.fetch("p1").await.unwrap().unwrap();
    assert_eq!(p.stock, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn stock_is_never_oversold_under_concurrent_orders() {
    let state = test_state();
    put_product(&state, "p1", "seller-1", 10.0, 3).await;

    let mut handles = Vec::new();
    for i in 0..6 {
        let st = state.clone();
        handles.push(tokio::spawn(async move {
            let auth = buyer(&format!("buyer-{i}"));
            order_service::create_order(&st, &auth, order_request("seller-1", "p1", 1)).await
        }));
    }

    let mut successes: i64 = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert!(matches!(
                e,
                OrderError::InsufficientStock { .. } | OrderError::Contention
            )),
        }
    }

    assert!(successes <= 3);

    let p = state.products.fetch("p1").await.unwrap().unwrap();
    assert_eq!(p.stock, 3 - successes);
    assert!(p.stock >= 0);
}

#[tokio::test]
async fn reservation_is_all_or_nothing_across_products() {
    let state = test_state();
    put_product(&state, "p1", "seller-1", 10.0, 5).await;
    put_product(&state, "p2", "seller-1", 10.0, 0).await;

    let err = inventory_service::reserve(
        &state,
        &[
            ReservationItem {
                product_id: "p1".to_string(),
                quantity: 1,
            },
            ReservationItem {
                product_id: "p2".to_string(),
                quantity: 1,
            },
        ],
    )
    .await
    .unwrap_err();

    match err {
        OrderError::InsufficientStock { product_id } => assert_eq!(product_id, "p2"),
        other => panic!("unexpected error: {other:?}"),
    }

    // the passing line was not decremented either
    let p1 = state.products.fetch("p1").await.unwrap().unwrap();
    assert_eq!(p1.stock, 5);
}

#[tokio::test]
async fn duplicate_lines_cannot_bypass_the_stock_check() {
    let state = test_state();
    put_product(&state, "p1", "seller-1", 10.0, 1).await;

    let err = inventory_service::reserve(
        &state,
        &[
            ReservationItem {
                product_id: "p1".to_string(),
                quantity: 1,
            },
            ReservationItem {
                product_id: "p1".to_string(),
                quantity: 1,
            },
        ],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OrderError::InsufficientStock { .. }));

    let p = state.products.fetch("p1").await.unwrap().unwrap();
    assert_eq!(p.stock, 1);
}

#[tokio::test]
async fn quantities_that_overflow_when_summed_are_rejected() {
    let state = test_state();
    put_product(&state, "p1", "seller-1", 10.0, 5).await;

    // two lines whose sum does not fit in an i64
    let mut req = order_request("seller-1", "p1", i64::MAX);
    req.items.push(NewOrderItem {
        product_id: "p1".to_string(),
        quantity: i64::MAX,
    });

    let err = order_service::create_order(&state, &buyer("buyer-1"), req)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidArgument(_)));
    assert!(err.to_string().contains("quantity"));

    let p = state.products.fetch("p1").await.unwrap().unwrap();
    assert_eq!(p.stock, 5);
}

#[tokio::test]
async fn duplicate_lines_stay_separate_on_the_order() {
    let state = test_state();
    put_product(&state, "p1", "seller-1", 10.0, 5).await;

    let mut req = order_request("seller-1", "p1", 1);
    req.items.push(NewOrderItem {
        product_id: "p1".to_string(),
        quantity: 1,
    });

    let order = order_service::create_order(&state, &buyer("buyer-1"), req)
        .await
        .unwrap();
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.total_amount, 20.0);

    let p = state.products.fetch("p1").await.unwrap().unwrap();
    assert_eq!(p.stock, 3);
}

#[tokio::test]
async fn inactive_products_cannot_be_reserved() {
    let state = test_state();
    state
        .products
        .put(Product {
            id: "p1".to_string(),
            name: "Product p1".to_string(),
            price: 10.0,
            stock: 5,
            seller_id: "seller-1".to_string(),
            active: false,
            updated_at: 0,
            version: 0,
        })
        .await
        .unwrap();

    let err = inventory_service::reserve(
        &state,
        &[ReservationItem {
            product_id: "p1".to_string(),
            quantity: 1,
        }],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OrderError::InsufficientStock { .. }));

    let p = state.products.fetch("p1").await.unwrap().unwrap();
    assert_eq!(p.stock, 5);
}

#[tokio::test]
async fn multi_item_orders_reserve_every_line() {
    let state = test_state();
    put_product(&state, "p1", "seller-1", 10.0, 5).await;
    put_product(&state, "p2", "seller-1", 4.0, 5).await;

    let req = CreateOrderRequest {
        seller_id: "seller-1".to_string(),
        items: vec![
            NewOrderItem {
                product_id: "p1".to_string(),
                quantity: 2,
            },
            NewOrderItem {
                product_id: "p2".to_string(),
                quantity: 3,
            },
        ],
        payment_method: "MobileWalletB".to_string(),
        delivery_address: DeliveryAddress {
            street: "12 Lake Road".to_string(),
            city: "Riverton".to_string(),
            phone: "+1 555-0101".to_string(),
        },
    };

    let order = order_service::create_order(&state, &buyer("buyer-1"), req)
        .await
        .unwrap();
    assert_eq!(order.total_amount, 32.0);

    let p1 = state.products.fetch("p1").await.unwrap().unwrap();
    let p2 = state.products.fetch("p2").await.unwrap().unwrap();
    assert_eq!(p1.stock, 3);
    assert_eq!(p2.stock, 2);
}

#[tokio::test]
async fn reservation_failure_persists_no_order() {
    let state = test_state();
    put_product(&state, "p1", "seller-1", 10.0, 1).await;

    let b = buyer("buyer-1");
    let err = order_service::create_order(&state, &b, order_request("seller-1", "p1", 2))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InsufficientStock { .. }));

    let orders = order_service::get_user_orders(&state, &b).await.unwrap();
    assert!(orders.is_empty());
}
