use std::sync::Arc;

use harvest_gateway::StubGateway;
use harvest_hex::config::Config;
use harvest_hex::inbound::http::{AppState, HttpServer, HttpServerConfig};
use harvest_repo::{build_store, Store};
use harvest_types::domain::product::Product;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for DATABASE_URL / SERVER_PORT when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
        .init();

    let config = Config::from_env()?;
    let store: Arc<Store> = Arc::new(build_store(config.database_url.as_deref()).await?);

    if std::env::var("SEED_DEMO_CATALOG").is_ok() {
        seed_demo_catalog(&store).await?;
    }

    let gateway = Arc::new(StubGateway::new());
    let state = AppState::new(store, gateway, &config);

    let server_cfg = HttpServerConfig {
        port: config.server_port.clone(),
    };
    HttpServer::new(state, server_cfg).run().await
}

/// A handful of products so a fresh instance has something to sell.
async fn seed_demo_catalog(store: &Store) -> anyhow::Result<()> {
    let demo = [
        ("Tomatoes", "Vegetables", 150_i64, 40_u32),
        ("Red Rice", "Grains", 200, 100),
        ("King Coconut", "Fruits", 250, 25),
        ("Green Beans", "Vegetables", 300, 15),
    ];
    for (name, category, price_cents, available_qty) in demo {
        store
            .seed_product(Product {
                id: uuid::Uuid::new_v4(),
                farmer_id: "demo-farmer@example.com".into(),
                name: name.into(),
                price_cents,
                category: category.into(),
                image_ref: None,
                available_qty,
            })
            .await?;
    }
    tracing::info!("seeded demo catalog");
    Ok(())
}
