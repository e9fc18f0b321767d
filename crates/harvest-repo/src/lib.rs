#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a store feature: `memory` or `sqlite`.");

use uuid::Uuid;

use harvest_types::domain::cart::{Cart, CartItem};
use harvest_types::domain::order::{Order, OrderItem};
use harvest_types::domain::payment::Payment;
use harvest_types::domain::product::Product;
use harvest_types::ports::cart_repository::CartRepository;
use harvest_types::ports::catalog::Catalog;
use harvest_types::ports::order_repository::OrderRepository;
use harvest_types::ports::payment_repository::PaymentRepository;
use harvest_types::ports::RepoError;

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Feature-selected storage backend. SQLite wins when both features are
/// enabled.
pub struct Store {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    memory: memory::InMemoryStore,
    #[cfg(feature = "sqlite")]
    sqlite: sqlite::SqliteStore,
}

pub async fn build_store(url: Option<&str>) -> anyhow::Result<Store> {
    Store::build(url).await
}

impl Store {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    pub async fn build(_: Option<&str>) -> anyhow::Result<Self> {
        Ok(Self {
            memory: memory::InMemoryStore::new(),
        })
    }

    #[cfg(feature = "sqlite")]
    pub async fn build(database_url: Option<&str>) -> anyhow::Result<Self> {
        let url = database_url.unwrap_or("sqlite://harvest.db");
        let sqlite = sqlite::SqliteStore::new(url).await?;
        Ok(Self { sqlite })
    }

    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    pub async fn seed_product(&self, product: Product) -> Result<(), RepoError> {
        self.memory.seed_product(product);
        Ok(())
    }

    #[cfg(feature = "sqlite")]
    pub async fn seed_product(&self, product: Product) -> Result<(), RepoError> {
        self.sqlite.seed_product(product).await
    }
}

#[cfg(all(feature = "memory", not(feature = "sqlite")))]
#[async_trait::async_trait]
impl CartRepository for Store {
    async fn active_cart(&self, buyer_id: &str) -> Result<Option<Cart>, RepoError> {
        self.memory.active_cart(buyer_id).await
    }

    async fn insert_cart(&self, cart: Cart) -> Result<Cart, RepoError> {
        self.memory.insert_cart(cart).await
    }

    async fn save_cart(&self, cart: &Cart) -> Result<(), RepoError> {
        self.memory.save_cart(cart).await
    }

    async fn cart_items(&self, cart_id: Uuid) -> Result<Vec<CartItem>, RepoError> {
        self.memory.cart_items(cart_id).await
    }

    async fn find_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartItem>, RepoError> {
        self.memory.find_item(cart_id, product_id).await
    }

    async fn upsert_item(&self, item: CartItem) -> Result<CartItem, RepoError> {
        self.memory.upsert_item(item).await
    }

    async fn delete_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<bool, RepoError> {
        self.memory.delete_item(cart_id, product_id).await
    }

    async fn clear_items(&self, cart_id: Uuid) -> Result<(), RepoError> {
        self.memory.clear_items(cart_id).await
    }
}

#[cfg(all(feature = "memory", not(feature = "sqlite")))]
#[async_trait::async_trait]
impl OrderRepository for Store {
    async fn create_order(&self, order: Order, items: Vec<OrderItem>) -> Result<Order, RepoError> {
        self.memory.create_order(order, items).await
    }

    async fn order(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        self.memory.order(id).await
    }

    async fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, RepoError> {
        self.memory.order_items(order_id).await
    }

    async fn orders_by_customer(&self, buyer_id: &str) -> Result<Vec<Order>, RepoError> {
        self.memory.orders_by_customer(buyer_id).await
    }

    async fn save_order(&self, order: &Order) -> Result<(), RepoError> {
        self.memory.save_order(order).await
    }

    async fn delete_order(&self, id: Uuid) -> Result<(), RepoError> {
        self.memory.delete_order(id).await
    }

    async fn cancel_pending(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        self.memory.cancel_pending(id).await
    }
}

#[cfg(all(feature = "memory", not(feature = "sqlite")))]
#[async_trait::async_trait]
impl PaymentRepository for Store {
    async fn insert_payment(&self, payment: Payment) -> Result<Payment, RepoError> {
        self.memory.insert_payment(payment).await
    }

    async fn payment(&self, id: Uuid) -> Result<Option<Payment>, RepoError> {
        self.memory.payment(id).await
    }

    async fn save_payment(&self, payment: &Payment) -> Result<(), RepoError> {
        self.memory.save_payment(payment).await
    }

    async fn payments_for_order(&self, order_id: Uuid) -> Result<Vec<Payment>, RepoError> {
        self.memory.payments_for_order(order_id).await
    }
}

#[cfg(all(feature = "memory", not(feature = "sqlite")))]
#[async_trait::async_trait]
impl Catalog for Store {
    async fn product(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        self.memory.product(id).await
    }

    async fn try_reserve(&self, id: Uuid, qty: u32) -> Result<bool, RepoError> {
        self.memory.try_reserve(id, qty).await
    }

    async fn release(&self, id: Uuid, qty: u32) -> Result<(), RepoError> {
        self.memory.release(id, qty).await
    }
}

#[cfg(feature = "sqlite")]
#[async_trait::async_trait]
impl CartRepository for Store {
    async fn active_cart(&self, buyer_id: &str) -> Result<Option<Cart>, RepoError> {
        self.sqlite.active_cart(buyer_id).await
    }

    async fn insert_cart(&self, cart: Cart) -> Result<Cart, RepoError> {
        self.sqlite.insert_cart(cart).await
    }

    async fn save_cart(&self, cart: &Cart) -> Result<(), RepoError> {
        self.sqlite.save_cart(cart).await
    }

    async fn cart_items(&self, cart_id: Uuid) -> Result<Vec<CartItem>, RepoError> {
        self.sqlite.cart_items(cart_id).await
    }

    async fn find_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartItem>, RepoError> {
        self.sqlite.find_item(cart_id, product_id).await
    }

    async fn upsert_item(&self, item: CartItem) -> Result<CartItem, RepoError> {
        self.sqlite.upsert_item(item).await
    }

    async fn delete_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<bool, RepoError> {
        self.sqlite.delete_item(cart_id, product_id).await
    }

    async fn clear_items(&self, cart_id: Uuid) -> Result<(), RepoError> {
        self.sqlite.clear_items(cart_id).await
    }
}

#[cfg(feature = "sqlite")]
#[async_trait::async_trait]
impl OrderRepository for Store {
    async fn create_order(&self, order: Order, items: Vec<OrderItem>) -> Result<Order, RepoError> {
        self.sqlite.create_order(order, items).await
    }

    async fn order(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        self.sqlite.order(id).await
    }

    async fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, RepoError> {
        self.sqlite.order_items(order_id).await
    }

    async fn orders_by_customer(&self, buyer_id: &str) -> Result<Vec<Order>, RepoError> {
        self.sqlite.orders_by_customer(buyer_id).await
    }

    async fn save_order(&self, order: &Order) -> Result<(), RepoError> {
        self.sqlite.save_order(order).await
    }

    async fn delete_order(&self, id: Uuid) -> Result<(), RepoError> {
        self.sqlite.delete_order(id).await
    }

    async fn cancel_pending(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        self.sqlite.cancel_pending(id).await
    }
}

#[cfg(feature = "sqlite")]
#[async_trait::async_trait]
impl PaymentRepository for Store {
    async fn insert_payment(&self, payment: Payment) -> Result<Payment, RepoError> {
        self.sqlite.insert_payment(payment).await
    }

    async fn payment(&self, id: Uuid) -> Result<Option<Payment>, RepoError> {
        self.sqlite.payment(id).await
    }

    async fn save_payment(&self, payment: &Payment) -> Result<(), RepoError> {
        self.sqlite.save_payment(payment).await
    }

    async fn payments_for_order(&self, order_id: Uuid) -> Result<Vec<Payment>, RepoError> {
        self.sqlite.payments_for_order(order_id).await
    }
}

#[cfg(feature = "sqlite")]
#[async_trait::async_trait]
impl Catalog for Store {
    async fn product(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        self.sqlite.product(id).await
    }

    async fn try_reserve(&self, id: Uuid, qty: u32) -> Result<bool, RepoError> {
        self.sqlite.try_reserve(id, qty).await
    }

    async fn release(&self, id: Uuid, qty: u32) -> Result<(), RepoError> {
        self.sqlite.release(id, qty).await
    }
}
