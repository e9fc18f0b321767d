use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use harvest_types::domain::cart::{Cart, CartItem, CartStatus};
use harvest_types::domain::order::{Order, OrderItem, OrderStatus};
use harvest_types::domain::payment::Payment;
use harvest_types::domain::product::Product;
use harvest_types::ports::cart_repository::CartRepository;
use harvest_types::ports::catalog::Catalog;
use harvest_types::ports::order_repository::OrderRepository;
use harvest_types::ports::payment_repository::PaymentRepository;
use harvest_types::ports::RepoError;

/// In-memory backend over concurrent maps. Cart lines are keyed by
/// `(cart_id, product_id)`, matching the one-line-per-product rule.
#[derive(Clone)]
pub struct InMemoryStore {
    products: Arc<DashMap<Uuid, Product>>,
    carts: Arc<DashMap<Uuid, Cart>>,
    active_carts: Arc<DashMap<String, Uuid>>,
    cart_items: Arc<DashMap<(Uuid, Uuid), CartItem>>,
    orders: Arc<DashMap<Uuid, Order>>,
    order_items: Arc<DashMap<Uuid, Vec<OrderItem>>>,
    payments: Arc<DashMap<Uuid, Payment>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            products: Arc::new(DashMap::new()),
            carts: Arc::new(DashMap::new()),
            active_carts: Arc::new(DashMap::new()),
            cart_items: Arc::new(DashMap::new()),
            orders: Arc::new(DashMap::new()),
            order_items: Arc::new(DashMap::new()),
            payments: Arc::new(DashMap::new()),
        }
    }

    /// Catalog writes belong to the farmer-facing subsystem; this is the
    /// seeding hook for the binary and tests.
    pub fn seed_product(&self, product: Product) {
        self.products.insert(product.id, product);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn active_cart(&self, buyer_id: &str) -> Result<Option<Cart>, RepoError> {
        let Some(id) = self.active_carts.get(buyer_id).map(|r| *r) else {
            return Ok(None);
        };
        Ok(self
            .carts
            .get(&id)
            .filter(|c| c.status == CartStatus::Active)
            .map(|c| c.clone()))
    }

    async fn insert_cart(&self, cart: Cart) -> Result<Cart, RepoError> {
        if cart.status == CartStatus::Active {
            self.active_carts.insert(cart.buyer_id.clone(), cart.id);
        }
        self.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn save_cart(&self, cart: &Cart) -> Result<(), RepoError> {
        if cart.status != CartStatus::Active {
            self.active_carts
                .remove_if(&cart.buyer_id, |_, id| *id == cart.id);
        }
        self.carts.insert(cart.id, cart.clone());
        Ok(())
    }

    async fn cart_items(&self, cart_id: Uuid) -> Result<Vec<CartItem>, RepoError> {
        Ok(self
            .cart_items
            .iter()
            .filter(|kv| kv.key().0 == cart_id)
            .map(|kv| kv.value().clone())
            .collect())
    }

    async fn find_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartItem>, RepoError> {
        Ok(self
            .cart_items
            .get(&(cart_id, product_id))
            .map(|r| r.clone()))
    }

    async fn upsert_item(&self, item: CartItem) -> Result<CartItem, RepoError> {
        self.cart_items
            .insert((item.cart_id, item.product_id), item.clone());
        Ok(item)
    }

    async fn delete_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<bool, RepoError> {
        Ok(self.cart_items.remove(&(cart_id, product_id)).is_some())
    }

    async fn clear_items(&self, cart_id: Uuid) -> Result<(), RepoError> {
        self.cart_items.retain(|k, _| k.0 != cart_id);
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create_order(&self, order: Order, items: Vec<OrderItem>) -> Result<Order, RepoError> {
        self.order_items.insert(order.id, items);
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn order(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        Ok(self.orders.get(&id).map(|r| r.clone()))
    }

    async fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, RepoError> {
        Ok(self
            .order_items
            .get(&order_id)
            .map(|r| r.clone())
            .unwrap_or_default())
    }

    async fn orders_by_customer(&self, buyer_id: &str) -> Result<Vec<Order>, RepoError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|kv| kv.value().customer_id == buyer_id)
            .map(|kv| kv.value().clone())
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn save_order(&self, order: &Order) -> Result<(), RepoError> {
        self.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn delete_order(&self, id: Uuid) -> Result<(), RepoError> {
        self.orders.remove(&id);
        self.order_items.remove(&id);
        Ok(())
    }

    async fn cancel_pending(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        // The entry guard makes the check-and-flip atomic: a second caller
        // sees Cancelled and gets None.
        let Some(mut entry) = self.orders.get_mut(&id) else {
            return Ok(None);
        };
        if entry.status != OrderStatus::Pending {
            return Ok(None);
        }
        entry.status = OrderStatus::Cancelled;
        entry.updated_at = chrono::Utc::now();
        Ok(Some(entry.clone()))
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn insert_payment(&self, payment: Payment) -> Result<Payment, RepoError> {
        self.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn payment(&self, id: Uuid) -> Result<Option<Payment>, RepoError> {
        Ok(self.payments.get(&id).map(|r| r.clone()))
    }

    async fn save_payment(&self, payment: &Payment) -> Result<(), RepoError> {
        self.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn payments_for_order(&self, order_id: Uuid) -> Result<Vec<Payment>, RepoError> {
        let mut rows: Vec<Payment> = self
            .payments
            .iter()
            .filter(|kv| kv.value().order_id == order_id)
            .map(|kv| kv.value().clone())
            .collect();
        rows.sort_by_key(|p| p.created_at);
        Ok(rows)
    }
}

#[async_trait]
impl Catalog for InMemoryStore {
    async fn product(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        Ok(self.products.get(&id).map(|r| r.clone()))
    }

    async fn try_reserve(&self, id: Uuid, qty: u32) -> Result<bool, RepoError> {
        // The entry guard holds the shard lock, so check-and-decrement is
        // atomic with respect to concurrent reservations.
        match self.products.get_mut(&id) {
            Some(mut p) if p.available_qty >= qty => {
                p.available_qty -= qty;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release(&self, id: Uuid, qty: u32) -> Result<(), RepoError> {
        if let Some(mut p) = self.products.get_mut(&id) {
            p.available_qty += qty;
        }
        Ok(())
    }
}
