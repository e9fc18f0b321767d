use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use harvest_types::domain::cart::{Cart, CartItem, CartStatus};
use harvest_types::domain::order::{
    Delivery, Order, OrderItem, OrderItemStatus, OrderStatus, PaymentStatus,
};
use harvest_types::domain::payment::{Payment, PaymentState};
use harvest_types::domain::product::Product;
use harvest_types::ports::cart_repository::CartRepository;
use harvest_types::ports::catalog::Catalog;
use harvest_types::ports::order_repository::OrderRepository;
use harvest_types::ports::payment_repository::PaymentRepository;
use harvest_types::ports::RepoError;

pub struct SqliteStore {
    pool: SqlitePool,
}

fn db_err(e: impl std::fmt::Display) -> RepoError {
    RepoError::DbError(e.to_string())
}

fn parse_uuid(s: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(s).map_err(db_err)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, RepoError> {
    Ok(DateTime::parse_from_rfc3339(s)
        .map_err(db_err)?
        .with_timezone(&Utc))
}

fn parse_cart_status(s: &str) -> Result<CartStatus, RepoError> {
    match s {
        "Active" => Ok(CartStatus::Active),
        "CheckedOut" => Ok(CartStatus::CheckedOut),
        "Abandoned" => Ok(CartStatus::Abandoned),
        other => Err(RepoError::DbError(format!("unknown cart status {other}"))),
    }
}

fn parse_order_status(s: &str) -> Result<OrderStatus, RepoError> {
    match s {
        "Pending" => Ok(OrderStatus::Pending),
        "Confirmed" => Ok(OrderStatus::Confirmed),
        "Processing" => Ok(OrderStatus::Processing),
        "Shipped" => Ok(OrderStatus::Shipped),
        "Delivered" => Ok(OrderStatus::Delivered),
        "Cancelled" => Ok(OrderStatus::Cancelled),
        other => Err(RepoError::DbError(format!("unknown order status {other}"))),
    }
}

fn parse_payment_status(s: &str) -> Result<PaymentStatus, RepoError> {
    match s {
        "Pending" => Ok(PaymentStatus::Pending),
        "Paid" => Ok(PaymentStatus::Paid),
        "Failed" => Ok(PaymentStatus::Failed),
        "Refunded" => Ok(PaymentStatus::Refunded),
        other => Err(RepoError::DbError(format!(
            "unknown payment status {other}"
        ))),
    }
}

fn parse_item_status(s: &str) -> Result<OrderItemStatus, RepoError> {
    match s {
        "Pending" => Ok(OrderItemStatus::Pending),
        "Fulfilled" => Ok(OrderItemStatus::Fulfilled),
        "Cancelled" => Ok(OrderItemStatus::Cancelled),
        other => Err(RepoError::DbError(format!(
            "unknown order item status {other}"
        ))),
    }
}

fn parse_payment_state(s: &str) -> Result<PaymentState, RepoError> {
    match s {
        "Pending" => Ok(PaymentState::Pending),
        "Processing" => Ok(PaymentState::Processing),
        "Completed" => Ok(PaymentState::Completed),
        "Failed" => Ok(PaymentState::Failed),
        "Refunded" => Ok(PaymentState::Refunded),
        other => Err(RepoError::DbError(format!("unknown payment state {other}"))),
    }
}

#[derive(FromRow)]
struct DbCart {
    id: String,
    buyer_id: String,
    total_cents: i64,
    total_items: i64,
    status: String,
    created_at: String,
    updated_at: String,
}

impl DbCart {
    fn into_cart(self) -> Result<Cart, RepoError> {
        Ok(Cart {
            id: parse_uuid(&self.id)?,
            buyer_id: self.buyer_id,
            total_cents: self.total_cents,
            total_items: self.total_items as u32,
            status: parse_cart_status(&self.status)?,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct DbCartItem {
    cart_id: String,
    product_id: String,
    farmer_id: String,
    product_name: String,
    unit_price_cents: i64,
    category: String,
    image_ref: Option<String>,
    quantity: i64,
    line_total_cents: i64,
    added_at: String,
    updated_at: String,
}

impl DbCartItem {
    fn into_item(self) -> Result<CartItem, RepoError> {
        Ok(CartItem {
            cart_id: parse_uuid(&self.cart_id)?,
            product_id: parse_uuid(&self.product_id)?,
            farmer_id: self.farmer_id,
            product_name: self.product_name,
            unit_price_cents: self.unit_price_cents,
            category: self.category,
            image_ref: self.image_ref,
            quantity: self.quantity as u32,
            line_total_cents: self.line_total_cents,
            added_at: parse_ts(&self.added_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct DbOrder {
    id: String,
    customer_id: String,
    total_cents: i64,
    status: String,
    payment_status: String,
    payment_id: Option<String>,
    delivery_address: String,
    delivery_city: String,
    delivery_postal_code: String,
    contact_phone: String,
    instructions: Option<String>,
    created_at: String,
    updated_at: String,
}

impl DbOrder {
    fn into_order(self) -> Result<Order, RepoError> {
        Ok(Order {
            id: parse_uuid(&self.id)?,
            customer_id: self.customer_id,
            total_cents: self.total_cents,
            status: parse_order_status(&self.status)?,
            payment_status: parse_payment_status(&self.payment_status)?,
            payment_id: self.payment_id.as_deref().map(parse_uuid).transpose()?,
            delivery: Delivery {
                address: self.delivery_address,
                city: self.delivery_city,
                postal_code: self.delivery_postal_code,
                contact_phone: self.contact_phone,
                instructions: self.instructions,
            },
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct DbOrderItem {
    order_id: String,
    product_id: String,
    farmer_id: String,
    product_name: String,
    unit_price_cents: i64,
    category: String,
    image_ref: Option<String>,
    quantity: i64,
    line_total_cents: i64,
    status: String,
    created_at: String,
}

impl DbOrderItem {
    fn into_item(self) -> Result<OrderItem, RepoError> {
        Ok(OrderItem {
            order_id: parse_uuid(&self.order_id)?,
            product_id: parse_uuid(&self.product_id)?,
            farmer_id: self.farmer_id,
            product_name: self.product_name,
            unit_price_cents: self.unit_price_cents,
            category: self.category,
            image_ref: self.image_ref,
            quantity: self.quantity as u32,
            line_total_cents: self.line_total_cents,
            status: parse_item_status(&self.status)?,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

#[derive(FromRow)]
struct DbPayment {
    id: String,
    order_id: String,
    buyer_id: String,
    amount_cents: i64,
    currency: String,
    method: String,
    gateway: String,
    state: String,
    transaction_id: Option<String>,
    gateway_response: Option<String>,
    failure_reason: Option<String>,
    created_at: String,
    processed_at: Option<String>,
    updated_at: String,
}

impl DbPayment {
    fn into_payment(self) -> Result<Payment, RepoError> {
        let gateway_response = self
            .gateway_response
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(db_err)?;
        Ok(Payment {
            id: parse_uuid(&self.id)?,
            order_id: parse_uuid(&self.order_id)?,
            buyer_id: self.buyer_id,
            amount_cents: self.amount_cents,
            currency: self.currency,
            method: self.method,
            gateway: self.gateway,
            state: parse_payment_state(&self.state)?,
            transaction_id: self.transaction_id,
            gateway_response,
            failure_reason: self.failure_reason,
            created_at: parse_ts(&self.created_at)?,
            processed_at: self.processed_at.as_deref().map(parse_ts).transpose()?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct DbProduct {
    id: String,
    farmer_id: String,
    name: String,
    price_cents: i64,
    category: String,
    image_ref: Option<String>,
    available_qty: i64,
}

impl DbProduct {
    fn into_product(self) -> Result<Product, RepoError> {
        Ok(Product {
            id: parse_uuid(&self.id)?,
            farmer_id: self.farmer_id,
            name: self.name,
            price_cents: self.price_cents,
            category: self.category,
            image_ref: self.image_ref,
            available_qty: self.available_qty as u32,
        })
    }
}

impl SqliteStore {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let ddl = include_str!("../migrations/0001_create_marketplace.sql");
        for stmt in ddl.split(';') {
            let stmt = stmt.trim();
            if stmt.is_empty() {
                continue;
            }
            sqlx::query(stmt).execute(&pool).await?;
        }

        Ok(Self { pool })
    }

    pub async fn seed_product(&self, product: Product) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT OR REPLACE INTO products
                 (id, farmer_id, name, price_cents, category, image_ref, available_qty)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(product.id.to_string())
        .bind(&product.farmer_id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(&product.category)
        .bind(&product.image_ref)
        .bind(product.available_qty as i64)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl CartRepository for SqliteStore {
    async fn active_cart(&self, buyer_id: &str) -> Result<Option<Cart>, RepoError> {
        let row: Option<DbCart> = sqlx::query_as(
            "SELECT id, buyer_id, total_cents, total_items, status, created_at, updated_at
             FROM carts WHERE buyer_id = ? AND status = 'Active'",
        )
        .bind(buyer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| r.into_cart()).transpose()
    }

    async fn insert_cart(&self, cart: Cart) -> Result<Cart, RepoError> {
        sqlx::query(
            "INSERT INTO carts (id, buyer_id, total_cents, total_items, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(cart.id.to_string())
        .bind(&cart.buyer_id)
        .bind(cart.total_cents)
        .bind(cart.total_items as i64)
        .bind(format!("{:?}", cart.status))
        .bind(cart.created_at.to_rfc3339())
        .bind(cart.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(cart)
    }

    async fn save_cart(&self, cart: &Cart) -> Result<(), RepoError> {
        sqlx::query(
            "UPDATE carts SET total_cents = ?, total_items = ?, status = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(cart.total_cents)
        .bind(cart.total_items as i64)
        .bind(format!("{:?}", cart.status))
        .bind(cart.updated_at.to_rfc3339())
        .bind(cart.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn cart_items(&self, cart_id: Uuid) -> Result<Vec<CartItem>, RepoError> {
        let rows: Vec<DbCartItem> = sqlx::query_as(
            "SELECT cart_id, product_id, farmer_id, product_name, unit_price_cents, category,
                    image_ref, quantity, line_total_cents, added_at, updated_at
             FROM cart_items WHERE cart_id = ? ORDER BY added_at",
        )
        .bind(cart_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(|r| r.into_item()).collect()
    }

    async fn find_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartItem>, RepoError> {
        let row: Option<DbCartItem> = sqlx::query_as(
            "SELECT cart_id, product_id, farmer_id, product_name, unit_price_cents, category,
                    image_ref, quantity, line_total_cents, added_at, updated_at
             FROM cart_items WHERE cart_id = ? AND product_id = ?",
        )
        .bind(cart_id.to_string())
        .bind(product_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| r.into_item()).transpose()
    }

    async fn upsert_item(&self, item: CartItem) -> Result<CartItem, RepoError> {
        sqlx::query(
            "INSERT OR REPLACE INTO cart_items
                 (cart_id, product_id, farmer_id, product_name, unit_price_cents, category,
                  image_ref, quantity, line_total_cents, added_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(item.cart_id.to_string())
        .bind(item.product_id.to_string())
        .bind(&item.farmer_id)
        .bind(&item.product_name)
        .bind(item.unit_price_cents)
        .bind(&item.category)
        .bind(&item.image_ref)
        .bind(item.quantity as i64)
        .bind(item.line_total_cents)
        .bind(item.added_at.to_rfc3339())
        .bind(item.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(item)
    }

    async fn delete_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM cart_items WHERE cart_id = ? AND product_id = ?")
            .bind(cart_id.to_string())
            .bind(product_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn clear_items(&self, cart_id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for SqliteStore {
    async fn create_order(&self, order: Order, items: Vec<OrderItem>) -> Result<Order, RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query(
            "INSERT INTO orders
                 (id, customer_id, total_cents, status, payment_status, payment_id,
                  delivery_address, delivery_city, delivery_postal_code, contact_phone,
                  instructions, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(order.id.to_string())
        .bind(&order.customer_id)
        .bind(order.total_cents)
        .bind(format!("{:?}", order.status))
        .bind(format!("{:?}", order.payment_status))
        .bind(order.payment_id.map(|id| id.to_string()))
        .bind(&order.delivery.address)
        .bind(&order.delivery.city)
        .bind(&order.delivery.postal_code)
        .bind(&order.delivery.contact_phone)
        .bind(&order.delivery.instructions)
        .bind(order.created_at.to_rfc3339())
        .bind(order.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        for item in &items {
            sqlx::query(
                "INSERT INTO order_items
                     (order_id, product_id, farmer_id, product_name, unit_price_cents,
                      category, image_ref, quantity, line_total_cents, status, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(item.order_id.to_string())
            .bind(item.product_id.to_string())
            .bind(&item.farmer_id)
            .bind(&item.product_name)
            .bind(item.unit_price_cents)
            .bind(&item.category)
            .bind(&item.image_ref)
            .bind(item.quantity as i64)
            .bind(item.line_total_cents)
            .bind(format!("{:?}", item.status))
            .bind(item.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(order)
    }

    async fn order(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        let row: Option<DbOrder> = sqlx::query_as(
            "SELECT id, customer_id, total_cents, status, payment_status, payment_id,
                    delivery_address, delivery_city, delivery_postal_code, contact_phone,
                    instructions, created_at, updated_at
             FROM orders WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| r.into_order()).transpose()
    }

    async fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, RepoError> {
        let rows: Vec<DbOrderItem> = sqlx::query_as(
            "SELECT order_id, product_id, farmer_id, product_name, unit_price_cents,
                    category, image_ref, quantity, line_total_cents, status, created_at
             FROM order_items WHERE order_id = ?",
        )
        .bind(order_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(|r| r.into_item()).collect()
    }

    async fn orders_by_customer(&self, buyer_id: &str) -> Result<Vec<Order>, RepoError> {
        let rows: Vec<DbOrder> = sqlx::query_as(
            "SELECT id, customer_id, total_cents, status, payment_status, payment_id,
                    delivery_address, delivery_city, delivery_postal_code, contact_phone,
                    instructions, created_at, updated_at
             FROM orders WHERE customer_id = ? ORDER BY created_at",
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(|r| r.into_order()).collect()
    }

    async fn save_order(&self, order: &Order) -> Result<(), RepoError> {
        sqlx::query(
            "UPDATE orders SET status = ?, payment_status = ?, payment_id = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(format!("{:?}", order.status))
        .bind(format!("{:?}", order.payment_status))
        .bind(order.payment_id.map(|id| id.to_string()))
        .bind(order.updated_at.to_rfc3339())
        .bind(order.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete_order(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn cancel_pending(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        // Conditional flip judged by rows_affected: concurrent cancels race
        // on this single UPDATE and only one of them wins.
        let result = sqlx::query(
            "UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(format!("{:?}", OrderStatus::Cancelled))
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id.to_string())
        .bind(format!("{:?}", OrderStatus::Pending))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.order(id).await
    }
}

#[async_trait]
impl PaymentRepository for SqliteStore {
    async fn insert_payment(&self, payment: Payment) -> Result<Payment, RepoError> {
        let gateway_response = payment
            .gateway_response
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(db_err)?;
        sqlx::query(
            "INSERT INTO payments
                 (id, order_id, buyer_id, amount_cents, currency, method, gateway, state,
                  transaction_id, gateway_response, failure_reason, created_at, processed_at,
                  updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(payment.id.to_string())
        .bind(payment.order_id.to_string())
        .bind(&payment.buyer_id)
        .bind(payment.amount_cents)
        .bind(&payment.currency)
        .bind(&payment.method)
        .bind(&payment.gateway)
        .bind(format!("{:?}", payment.state))
        .bind(&payment.transaction_id)
        .bind(gateway_response)
        .bind(&payment.failure_reason)
        .bind(payment.created_at.to_rfc3339())
        .bind(payment.processed_at.map(|t| t.to_rfc3339()))
        .bind(payment.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(payment)
    }

    async fn payment(&self, id: Uuid) -> Result<Option<Payment>, RepoError> {
        let row: Option<DbPayment> = sqlx::query_as(
            "SELECT id, order_id, buyer_id, amount_cents, currency, method, gateway, state,
                    transaction_id, gateway_response, failure_reason, created_at, processed_at,
                    updated_at
             FROM payments WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| r.into_payment()).transpose()
    }

    async fn save_payment(&self, payment: &Payment) -> Result<(), RepoError> {
        let gateway_response = payment
            .gateway_response
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(db_err)?;
        sqlx::query(
            "UPDATE payments SET state = ?, transaction_id = ?, gateway_response = ?,
                    failure_reason = ?, processed_at = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(format!("{:?}", payment.state))
        .bind(&payment.transaction_id)
        .bind(gateway_response)
        .bind(&payment.failure_reason)
        .bind(payment.processed_at.map(|t| t.to_rfc3339()))
        .bind(payment.updated_at.to_rfc3339())
        .bind(payment.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn payments_for_order(&self, order_id: Uuid) -> Result<Vec<Payment>, RepoError> {
        let rows: Vec<DbPayment> = sqlx::query_as(
            "SELECT id, order_id, buyer_id, amount_cents, currency, method, gateway, state,
                    transaction_id, gateway_response, failure_reason, created_at, processed_at,
                    updated_at
             FROM payments WHERE order_id = ? ORDER BY created_at",
        )
        .bind(order_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(|r| r.into_payment()).collect()
    }
}

#[async_trait]
impl Catalog for SqliteStore {
    async fn product(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        let row: Option<DbProduct> = sqlx::query_as(
            "SELECT id, farmer_id, name, price_cents, category, image_ref, available_qty
             FROM products WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| r.into_product()).transpose()
    }

    async fn try_reserve(&self, id: Uuid, qty: u32) -> Result<bool, RepoError> {
        // Single conditional UPDATE; rows_affected is the verdict, so two
        // concurrent reservations can never both take the last unit.
        let res = sqlx::query(
            "UPDATE products SET available_qty = available_qty - ?1
             WHERE id = ?2 AND available_qty >= ?1",
        )
        .bind(qty as i64)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn release(&self, id: Uuid, qty: u32) -> Result<(), RepoError> {
        sqlx::query("UPDATE products SET available_qty = available_qty + ? WHERE id = ?")
            .bind(qty as i64)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
