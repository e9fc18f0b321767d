//! End-to-end service flows over the in-memory store and stub gateway:
//! cart to order to payment, with the failure paths in between.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use harvest_gateway::StubGateway;
use harvest_hex::application::buyer_locks::BuyerLocks;
use harvest_hex::application::cart_service::CartService;
use harvest_hex::application::checkout_service::CheckoutService;
use harvest_hex::application::order_service::OrderLifecycle;
use harvest_hex::application::payment_service::PaymentService;
use harvest_hex::errors::AppError;
use harvest_repo::memory::InMemoryStore;
use harvest_types::domain::order::{Delivery, OrderStatus, PaymentStatus};
use harvest_types::domain::payment::PaymentState;
use harvest_types::domain::product::Product;
use harvest_types::ports::catalog::Catalog;
use harvest_types::ports::payment_gateway::{
    GatewayError, IntentMetadata, IntentSnapshot, OpenedIntent, PaymentGateway,
};
use harvest_types::ports::payment_repository::PaymentRepository;

struct Services {
    store: Arc<InMemoryStore>,
    gateway: Arc<StubGateway>,
    carts: CartService<InMemoryStore>,
    checkout: CheckoutService<InMemoryStore>,
    payments: PaymentService<InMemoryStore, StubGateway>,
    orders: OrderLifecycle<InMemoryStore>,
}

fn services() -> Services {
    let store = Arc::new(InMemoryStore::new());
    let gateway = Arc::new(StubGateway::new());
    let locks = BuyerLocks::new();
    Services {
        carts: CartService::new(store.clone(), locks.clone()),
        checkout: CheckoutService::new(store.clone(), locks),
        payments: PaymentService::new(
            store.clone(),
            gateway.clone(),
            "LKR".into(),
            Duration::from_millis(500),
        ),
        orders: OrderLifecycle::new(store.clone()),
        store,
        gateway,
    }
}

fn seed(store: &InMemoryStore, name: &str, price_cents: i64, available_qty: u32) -> Uuid {
    let product = Product {
        id: Uuid::new_v4(),
        farmer_id: "farmer-1".into(),
        name: name.into(),
        price_cents,
        category: "Vegetables".into(),
        image_ref: None,
        available_qty,
    };
    let id = product.id;
    store.seed_product(product);
    id
}

fn delivery() -> Delivery {
    Delivery {
        address: "12 Paddy Lane".into(),
        city: "Kandy".into(),
        postal_code: "20000".into(),
        contact_phone: "+94 77 123 4567".into(),
        instructions: Some("leave at the gate".into()),
    }
}

#[tokio::test]
async fn happy_path_from_cart_to_confirmed_order() {
    let svc = services();
    let buyer = "buyer@example.com";
    let tomatoes = seed(&svc.store, "Tomatoes", 150, 20);
    let beans = seed(&svc.store, "Green Beans", 300, 8);

    svc.carts.add_item(buyer, tomatoes, 4).await.unwrap();
    svc.carts.add_item(buyer, beans, 2).await.unwrap();

    let (order, items) = svc
        .checkout
        .create_order_from_cart(buyer, delivery())
        .await
        .unwrap();
    assert_eq!(order.total_cents, 4 * 150 + 2 * 300);
    assert_eq!(items.len(), 2);

    let intent = svc
        .payments
        .create_payment_intent(buyer, order.id)
        .await
        .unwrap();
    assert_eq!(intent.amount_cents, order.total_cents);

    svc.gateway.settle(&intent.payment_intent_id);
    let payment = svc
        .payments
        .process_payment(buyer, order.id, &intent.payment_intent_id)
        .await
        .unwrap();
    assert_eq!(payment.state, PaymentState::Completed);

    let order = svc
        .orders
        .apply_payment_outcome(order.id, PaymentStatus::Paid, Some(payment.id))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.payment_status, PaymentStatus::Paid);

    // Stock was drawn down exactly once.
    assert_eq!(
        svc.store.product(tomatoes).await.unwrap().unwrap().available_qty,
        16
    );
    assert_eq!(
        svc.store.product(beans).await.unwrap().unwrap().available_qty,
        6
    );
}

#[tokio::test]
async fn declined_card_leaves_order_payable_again() {
    let svc = services();
    let buyer = "buyer@example.com";
    let product = seed(&svc.store, "Carrots", 100, 10);

    svc.carts.add_item(buyer, product, 3).await.unwrap();
    let (order, _) = svc
        .checkout
        .create_order_from_cart(buyer, delivery())
        .await
        .unwrap();

    let first = svc
        .payments
        .create_payment_intent(buyer, order.id)
        .await
        .unwrap();
    svc.gateway.fail(&first.payment_intent_id, "canceled");
    let payment = svc
        .payments
        .process_payment(buyer, order.id, &first.payment_intent_id)
        .await
        .unwrap();
    assert_eq!(payment.state, PaymentState::Failed);

    let order = svc
        .orders
        .apply_payment_outcome(order.id, PaymentStatus::Failed, Some(payment.id))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Failed);

    // A fresh attempt on a new intent still works.
    let second = svc
        .payments
        .create_payment_intent(buyer, order.id)
        .await
        .unwrap();
    svc.gateway.settle(&second.payment_intent_id);
    let retry = svc
        .payments
        .process_payment(buyer, order.id, &second.payment_intent_id)
        .await
        .unwrap();
    assert_eq!(retry.state, PaymentState::Completed);

    let order = svc
        .orders
        .apply_payment_outcome(order.id, PaymentStatus::Paid, Some(retry.id))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);

    // Both attempts are on record.
    let attempts = svc.store.payments_for_order(order.id).await.unwrap();
    assert_eq!(attempts.len(), 2);
}

#[tokio::test]
async fn reprocessing_a_settled_intent_records_twice_but_confirms_once() {
    let svc = services();
    let buyer = "buyer@example.com";
    let product = seed(&svc.store, "Brinjal", 180, 10);

    svc.carts.add_item(buyer, product, 2).await.unwrap();
    let (order, _) = svc
        .checkout
        .create_order_from_cart(buyer, delivery())
        .await
        .unwrap();

    let intent = svc
        .payments
        .create_payment_intent(buyer, order.id)
        .await
        .unwrap();
    svc.gateway.settle(&intent.payment_intent_id);

    // A confirmation replay (page refresh, client retry) verifies the same
    // intent again. Each verification is an audit row of its own.
    let first = svc
        .payments
        .process_payment(buyer, order.id, &intent.payment_intent_id)
        .await
        .unwrap();
    let second = svc
        .payments
        .process_payment(buyer, order.id, &intent.payment_intent_id)
        .await
        .unwrap();
    assert_eq!(first.state, PaymentState::Completed);
    assert_eq!(second.state, PaymentState::Completed);
    let rows = svc.store.payments_for_order(order.id).await.unwrap();
    assert_eq!(rows.len(), 2);

    // The order-side effect lands once; the replayed outcome is a no-op.
    let confirmed = svc
        .orders
        .apply_payment_outcome(order.id, PaymentStatus::Paid, Some(first.id))
        .await
        .unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    let replay = svc
        .orders
        .apply_payment_outcome(order.id, PaymentStatus::Paid, Some(second.id))
        .await
        .unwrap();
    assert_eq!(replay.status, OrderStatus::Confirmed);
    assert_eq!(replay.payment_id, Some(first.id));
}

#[tokio::test]
async fn cancelled_order_puts_stock_back_for_the_next_buyer() {
    let svc = services();
    let product = seed(&svc.store, "Pumpkin", 800, 2);

    svc.carts.add_item("alice@example.com", product, 2).await.unwrap();
    let (order, _) = svc
        .checkout
        .create_order_from_cart("alice@example.com", delivery())
        .await
        .unwrap();
    assert_eq!(
        svc.store.product(product).await.unwrap().unwrap().available_qty,
        0
    );

    // Bob cannot buy while Alice holds the reservation.
    let blocked = svc.carts.add_item("bob@example.com", product, 1).await;
    assert!(matches!(blocked, Err(AppError::InsufficientStock(_))));

    svc.orders
        .cancel_order("alice@example.com", order.id)
        .await
        .unwrap();
    assert_eq!(
        svc.store.product(product).await.unwrap().unwrap().available_qty,
        2
    );

    svc.carts.add_item("bob@example.com", product, 1).await.unwrap();
    let (bob_order, _) = svc
        .checkout
        .create_order_from_cart("bob@example.com", delivery())
        .await
        .unwrap();
    assert_eq!(bob_order.total_cents, 800);
}

#[tokio::test]
async fn two_buyers_full_flow_race_for_the_last_unit() {
    let svc = services();
    let product = seed(&svc.store, "King Coconut", 250, 1);
    let checkout = Arc::new(svc.checkout);

    svc.carts.add_item("alice@example.com", product, 1).await.unwrap();
    svc.carts.add_item("bob@example.com", product, 1).await.unwrap();

    let a = {
        let checkout = checkout.clone();
        tokio::spawn(
            async move { checkout.create_order_from_cart("alice@example.com", delivery()).await },
        )
    };
    let b = {
        let checkout = checkout.clone();
        tokio::spawn(
            async move { checkout.create_order_from_cart("bob@example.com", delivery()).await },
        )
    };
    let (a, b) = (a.await.unwrap(), b.await.unwrap());

    assert_eq!(
        [&a, &b].iter().filter(|r| r.is_ok()).count(),
        1,
        "exactly one buyer gets the last unit"
    );
    assert_eq!(
        svc.store.product(product).await.unwrap().unwrap().available_qty,
        0
    );

    // The winner can pay; the loser's cart is intact for another product.
    let (order, _) = a.or(b).unwrap();
    let intent = svc
        .payments
        .create_payment_intent(&order.customer_id, order.id)
        .await
        .unwrap();
    svc.gateway.settle(&intent.payment_intent_id);
    let payment = svc
        .payments
        .process_payment(&order.customer_id, order.id, &intent.payment_intent_id)
        .await
        .unwrap();
    assert_eq!(payment.state, PaymentState::Completed);
}

/// Gateway that never answers within the service timeout.
struct HangingGateway;

#[async_trait]
impl PaymentGateway for HangingGateway {
    async fn open_intent(
        &self,
        _amount_cents: i64,
        _currency: &str,
        _metadata: IntentMetadata,
    ) -> Result<OpenedIntent, GatewayError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        unreachable!("test gateway never completes")
    }

    async fn intent_status(&self, _intent_id: &str) -> Result<IntentSnapshot, GatewayError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        unreachable!("test gateway never completes")
    }
}

#[tokio::test]
async fn gateway_timeout_records_nothing() {
    let store = Arc::new(InMemoryStore::new());
    let locks = BuyerLocks::new();
    let carts = CartService::new(store.clone(), locks.clone());
    let checkout = CheckoutService::new(store.clone(), locks);
    let payments = PaymentService::new(
        store.clone(),
        Arc::new(HangingGateway),
        "LKR".into(),
        Duration::from_millis(50),
    );

    let product = seed(&store, "Okra", 120, 5);
    let buyer = "buyer@example.com";
    carts.add_item(buyer, product, 2).await.unwrap();
    let (order, _) = checkout.create_order_from_cart(buyer, delivery()).await.unwrap();

    let res = payments.create_payment_intent(buyer, order.id).await;
    assert!(matches!(res, Err(AppError::Gateway(_))));

    let res = payments.process_payment(buyer, order.id, "pi_whatever").await;
    assert!(matches!(res, Err(AppError::Gateway(_))));
    assert!(store.payments_for_order(order.id).await.unwrap().is_empty());
}
