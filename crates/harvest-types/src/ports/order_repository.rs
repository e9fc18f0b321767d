use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::{Order, OrderItem};
use crate::ports::RepoError;

#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    /// Persist the order and all of its items as one unit: either all rows
    /// land or none do.
    async fn create_order(&self, order: Order, items: Vec<OrderItem>) -> Result<Order, RepoError>;
    async fn order(&self, id: Uuid) -> Result<Option<Order>, RepoError>;
    async fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, RepoError>;
    async fn orders_by_customer(&self, buyer_id: &str) -> Result<Vec<Order>, RepoError>;
    async fn save_order(&self, order: &Order) -> Result<(), RepoError>;
    /// Remove the order and its items. Used to unwind an order whose
    /// follow-up bookkeeping could not be completed.
    async fn delete_order(&self, id: Uuid) -> Result<(), RepoError>;
    /// Flip a still-pending order to Cancelled in one conditional step.
    /// Returns the cancelled order, or `None` when the order is missing or
    /// no longer pending — at most one caller ever gets `Some`.
    async fn cancel_pending(&self, id: Uuid) -> Result<Option<Order>, RepoError>;
}
