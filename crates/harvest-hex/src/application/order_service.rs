use std::sync::Arc;

use uuid::Uuid;

use crate::errors::AppError;
use harvest_types::domain::order::{Order, OrderItem, OrderStatus, PaymentStatus};
use harvest_types::ports::catalog::Catalog;
use harvest_types::ports::order_repository::OrderRepository;

/// Drives an order's fulfilment and payment status transitions and the
/// inventory give-back on cancellation.
pub struct OrderLifecycle<S> {
    store: Arc<S>,
}

impl<S> OrderLifecycle<S>
where
    S: OrderRepository + Catalog,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn owned_order(&self, buyer_id: &str, order_id: Uuid) -> Result<Order, AppError> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
        if order.customer_id != buyer_id {
            return Err(AppError::Unauthorized(format!(
                "order {order_id} does not belong to this buyer"
            )));
        }
        Ok(order)
    }

    /// Folds a payment attempt's outcome into the order. Applying the same
    /// outcome twice is a no-op, so confirmation can be retried.
    pub async fn apply_payment_outcome(
        &self,
        order_id: Uuid,
        outcome: PaymentStatus,
        payment_id: Option<Uuid>,
    ) -> Result<Order, AppError> {
        let mut order = self
            .store
            .order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
        if order.payment_status == outcome {
            return Ok(order);
        }

        order.record_payment(outcome, payment_id);
        self.store.save_order(&order).await?;
        tracing::info!(
            %order_id,
            payment_status = ?order.payment_status,
            status = ?order.status,
            "payment outcome applied"
        );
        Ok(order)
    }

    /// Moves an order along the fulfilment track (confirm, ship, deliver).
    pub async fn update_status(
        &self,
        order_id: Uuid,
        next: OrderStatus,
    ) -> Result<Order, AppError> {
        let mut order = self
            .store
            .order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
        order
            .transition_to(next)
            .map_err(|e| AppError::InvalidStateTransition(e.to_string()))?;
        self.store.save_order(&order).await?;
        Ok(order)
    }

    /// Cancels a still-pending order and puts its stock back on the shelf.
    /// The flip to Cancelled is a single conditional store operation, so of
    /// any number of concurrent cancels exactly one wins and releases the
    /// inventory; the rest are rejected.
    pub async fn cancel_order(&self, buyer_id: &str, order_id: Uuid) -> Result<Order, AppError> {
        let order = self.owned_order(buyer_id, order_id).await?;

        let Some(cancelled) = self.store.cancel_pending(order_id).await? else {
            // Lost the race, or the order had already moved on.
            let status = self
                .store
                .order(order_id)
                .await?
                .map(|o| o.status)
                .unwrap_or(order.status);
            return Err(AppError::InvalidStateTransition(format!(
                "only pending orders can be cancelled, this one is {status:?}"
            )));
        };

        let items = self.store.order_items(order_id).await?;
        for item in &items {
            self.store.release(item.product_id, item.quantity).await?;
        }

        tracing::info!(%order_id, buyer = buyer_id, lines = items.len(), "order cancelled");
        Ok(cancelled)
    }

    pub async fn order_with_items(
        &self,
        buyer_id: &str,
        order_id: Uuid,
    ) -> Result<(Order, Vec<OrderItem>), AppError> {
        let order = self.owned_order(buyer_id, order_id).await?;
        let items = self.store.order_items(order_id).await?;
        Ok((order, items))
    }

    pub async fn orders_for(&self, buyer_id: &str) -> Result<Vec<Order>, AppError> {
        Ok(self.store.orders_by_customer(buyer_id).await?)
    }
}
