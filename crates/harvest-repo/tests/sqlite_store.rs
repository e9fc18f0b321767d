#![cfg(feature = "sqlite")]

use harvest_repo::sqlite::SqliteStore;
use harvest_types::domain::cart::{Cart, CartItem};
use harvest_types::domain::order::{Delivery, Order, OrderItem, OrderStatus, PaymentStatus};
use harvest_types::domain::payment::{Payment, PaymentState};
use harvest_types::domain::product::Product;
use harvest_types::ports::cart_repository::CartRepository;
use harvest_types::ports::catalog::Catalog;
use harvest_types::ports::order_repository::OrderRepository;
use harvest_types::ports::payment_repository::PaymentRepository;
use std::path::PathBuf;
use uuid::Uuid;

fn temp_db_url() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut path = PathBuf::from(dir.path());
    path.push(format!("harvest-{}.db", Uuid::new_v4()));
    let url = format!("sqlite://{}", path.display());
    (dir, url)
}

fn product(available_qty: u32) -> Product {
    Product {
        id: Uuid::new_v4(),
        farmer_id: "farmer-1".into(),
        name: "Red Rice".into(),
        price_cents: 200,
        category: "Grains".into(),
        image_ref: Some("img/rice.jpg".into()),
        available_qty,
    }
}

fn delivery() -> Delivery {
    Delivery {
        address: "12 Paddy Lane".into(),
        city: "Kandy".into(),
        postal_code: "20000".into(),
        contact_phone: "+94 77 123 4567".into(),
        instructions: Some("Leave at the gate".into()),
    }
}

#[tokio::test]
async fn cart_round_trip() {
    let (_dir, url) = temp_db_url();
    let store = SqliteStore::new(&url).await.unwrap();
    let buyer = "buyer@example.com";

    let mut cart = store.insert_cart(Cart::new(buyer.into())).await.unwrap();
    let p = product(10);
    store.seed_product(p.clone()).await.unwrap();

    let item = CartItem::new(cart.id, &p, 3);
    store.upsert_item(item.clone()).await.unwrap();
    let items = store.cart_items(cart.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].line_total_cents, 600);

    cart.apply_totals(&items);
    store.save_cart(&cart).await.unwrap();
    let active = store.active_cart(buyer).await.unwrap().unwrap();
    assert_eq!(active.total_cents, 600);
    assert_eq!(active.total_items, 3);

    // Upsert replaces the line for the same (cart, product).
    let mut merged = items[0].clone();
    merged.set_quantity(5);
    store.upsert_item(merged).await.unwrap();
    let items = store.cart_items(cart.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5);

    store.clear_items(cart.id).await.unwrap();
    assert!(store.cart_items(cart.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn order_create_is_atomic_and_readable() {
    let (_dir, url) = temp_db_url();
    let store = SqliteStore::new(&url).await.unwrap();

    let p = product(10);
    let line = CartItem::new(Uuid::new_v4(), &p, 2);
    let order = Order::new("buyer@example.com".into(), delivery(), 400).unwrap();
    let items = vec![OrderItem::from_cart_item(order.id, &line)];

    store.create_order(order.clone(), items).await.unwrap();

    let fetched = store.order(order.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, OrderStatus::Pending);
    assert_eq!(fetched.delivery.city, "Kandy");
    assert_eq!(fetched.delivery.instructions.as_deref(), Some("Leave at the gate"));

    let items = store.order_items(order.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);

    let mut updated = fetched.clone();
    updated.record_payment(PaymentStatus::Paid, Some(Uuid::new_v4()));
    store.save_order(&updated).await.unwrap();
    let reread = store.order(order.id).await.unwrap().unwrap();
    assert_eq!(reread.payment_status, PaymentStatus::Paid);
    assert_eq!(reread.status, OrderStatus::Confirmed);
    assert!(reread.payment_id.is_some());
}

#[tokio::test]
async fn cancel_pending_is_a_single_winner_update() {
    let (_dir, url) = temp_db_url();
    let store = SqliteStore::new(&url).await.unwrap();

    let order = Order::new("buyer@example.com".into(), delivery(), 400).unwrap();
    let order = store.create_order(order, Vec::new()).await.unwrap();

    let won = store.cancel_pending(order.id).await.unwrap().unwrap();
    assert_eq!(won.status, OrderStatus::Cancelled);
    // The row is no longer Pending, so the conditional UPDATE misses.
    assert!(store.cancel_pending(order.id).await.unwrap().is_none());
    assert!(store.cancel_pending(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_order_drops_order_and_its_items() {
    let (_dir, url) = temp_db_url();
    let store = SqliteStore::new(&url).await.unwrap();

    let p = product(10);
    let line = CartItem::new(Uuid::new_v4(), &p, 2);
    let order = Order::new("buyer@example.com".into(), delivery(), 400).unwrap();
    let items = vec![OrderItem::from_cart_item(order.id, &line)];
    let order = store.create_order(order, items).await.unwrap();

    store.delete_order(order.id).await.unwrap();
    assert!(store.order(order.id).await.unwrap().is_none());
    assert!(store.order_items(order.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn payment_rows_round_trip_with_raw_payload() {
    let (_dir, url) = temp_db_url();
    let store = SqliteStore::new(&url).await.unwrap();

    let order_id = Uuid::new_v4();
    let mut payment = Payment::new(
        order_id,
        "buyer@example.com".into(),
        1000,
        "LKR".into(),
        "CARD".into(),
        "STRIPE".into(),
    );
    payment.resolve(
        PaymentState::Completed,
        Some("pi_123".into()),
        Some(serde_json::json!({"status": "succeeded", "amount": 1000})),
        None,
    );
    store.insert_payment(payment.clone()).await.unwrap();

    let rows = store.payments_for_order(order_id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].state, PaymentState::Completed);
    assert_eq!(rows[0].transaction_id.as_deref(), Some("pi_123"));
    assert_eq!(
        rows[0].gateway_response.as_ref().unwrap()["status"],
        "succeeded"
    );
    assert!(rows[0].processed_at.is_some());

    let by_id = store.payment(payment.id).await.unwrap().unwrap();
    assert_eq!(by_id.amount_cents, 1000);
}

#[tokio::test]
async fn try_reserve_decrements_conditionally() {
    let (_dir, url) = temp_db_url();
    let store = SqliteStore::new(&url).await.unwrap();
    let p = product(5);
    store.seed_product(p.clone()).await.unwrap();

    assert!(store.try_reserve(p.id, 5).await.unwrap());
    assert!(!store.try_reserve(p.id, 1).await.unwrap());
    assert_eq!(store.product(p.id).await.unwrap().unwrap().available_qty, 0);

    store.release(p.id, 5).await.unwrap();
    assert_eq!(store.product(p.id).await.unwrap().unwrap().available_qty, 5);
}

#[tokio::test]
async fn missing_rows_read_as_none() {
    let (_dir, url) = temp_db_url();
    let store = SqliteStore::new(&url).await.unwrap();

    assert!(store.active_cart("nobody@example.com").await.unwrap().is_none());
    assert!(store.order(Uuid::new_v4()).await.unwrap().is_none());
    assert!(store.product(Uuid::new_v4()).await.unwrap().is_none());
    assert!(store
        .find_item(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}
