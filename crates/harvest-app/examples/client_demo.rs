///  To run :
///  cargo r --example client_demo
use std::sync::Arc;

use harvest_client::{DeliveryDetails, MarketClient};
use harvest_gateway::StubGateway;
use harvest_hex::config::Config;
use harvest_hex::inbound::http::{AppState, HttpServer, HttpServerConfig};
use harvest_repo::build_store;
use harvest_types::domain::product::Product;
use tempfile::tempdir;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Start server on ephemeral port.
    let port = find_free_port();
    let addr = format!("http://127.0.0.1:{port}/");

    // Use a temp file-backed SQLite DB so multiple connections see the same data.
    let tmp = tempdir()?;
    let db_path = tmp.path().join("harvest.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let store = Arc::new(build_store(Some(&db_url)).await?);
    let product_id = uuid::Uuid::new_v4();
    store
        .seed_product(Product {
            id: product_id,
            farmer_id: "farmer@example.com".into(),
            name: "Tomatoes".into(),
            price_cents: 150,
            category: "Vegetables".into(),
            image_ref: None,
            available_qty: 30,
        })
        .await?;

    let gateway = Arc::new(StubGateway::new());
    let config = Config {
        server_port: port.to_string(),
        database_url: Some(db_url),
        currency: "LKR".into(),
        publishable_key: "pk_test_demo".into(),
        gateway_timeout_ms: 5_000,
    };
    let state = AppState::new(store, gateway.clone(), &config);
    let server = HttpServer::new(
        state,
        HttpServerConfig {
            port: port.to_string(),
        },
    );

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // Walk the whole buyer journey against the running server.
    let client = MarketClient::new(&addr, "demo-buyer@example.com")?;

    let view = client.add_to_cart(product_id, 4).await?;
    println!(
        "Cart: {} items, {} cents",
        view.cart.total_items, view.cart.total_cents
    );

    let created = client
        .create_order(DeliveryDetails {
            delivery_address: "12 Paddy Lane".into(),
            delivery_city: "Kandy".into(),
            delivery_postal_code: "20000".into(),
            contact_phone: "+94 77 123 4567".into(),
            instructions: None,
        })
        .await?;
    println!(
        "Created order id={} total={} cents",
        created.order.id, created.order.total_cents
    );

    let intent = client.create_payment_intent(created.order.id).await?;
    println!("Payment intent {}", intent.payment_intent_id);

    // Settle the intent the way a card form would.
    gateway.settle(&intent.payment_intent_id);

    let confirmation = client
        .confirm_payment(created.order.id, &intent.payment_intent_id)
        .await?;
    println!(
        "Payment {:?}, order now {:?}/{:?}",
        confirmation.payment.state, confirmation.order.status, confirmation.order.payment_status
    );

    let history = client.orders().await?;
    println!("Buyer has {} order(s) on record", history.len());

    handle.abort();
    Ok(())
}
