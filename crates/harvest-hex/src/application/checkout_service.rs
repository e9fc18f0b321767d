use std::sync::Arc;

use uuid::Uuid;

use crate::application::buyer_locks::BuyerLocks;
use crate::errors::AppError;
use harvest_types::domain::order::{Delivery, Order, OrderItem};
use harvest_types::ports::cart_repository::CartRepository;
use harvest_types::ports::catalog::Catalog;
use harvest_types::ports::order_repository::OrderRepository;

/// Converts a buyer's active cart into an immutable order, reserving stock
/// line by line. A failure at any point releases whatever was already
/// reserved, so a failed checkout leaves no trace.
pub struct CheckoutService<S> {
    store: Arc<S>,
    locks: BuyerLocks,
}

impl<S> CheckoutService<S>
where
    S: CartRepository + OrderRepository + Catalog,
{
    pub fn new(store: Arc<S>, locks: BuyerLocks) -> Self {
        Self { store, locks }
    }

    pub async fn create_order_from_cart(
        &self,
        buyer_id: &str,
        delivery: Delivery,
    ) -> Result<(Order, Vec<OrderItem>), AppError> {
        let _guard = self.locks.acquire(buyer_id).await;

        let Some(mut cart) = self.store.active_cart(buyer_id).await? else {
            return Err(AppError::EmptyCart);
        };
        let cart_items = self.store.cart_items(cart.id).await?;
        if cart_items.is_empty() {
            return Err(AppError::EmptyCart);
        }

        // Reserve every line with a conditional decrement. Stock may have
        // moved since add-to-cart; the reservation itself is the
        // re-validation.
        let mut reserved: Vec<(Uuid, u32)> = Vec::with_capacity(cart_items.len());
        for line in &cart_items {
            let ok = match self.store.try_reserve(line.product_id, line.quantity).await {
                Ok(ok) => ok,
                Err(e) => {
                    self.release_reserved(&reserved).await;
                    return Err(e.into());
                }
            };
            if !ok {
                self.release_reserved(&reserved).await;
                return Err(match self.store.product(line.product_id).await? {
                    None => AppError::NotFound(format!("product {}", line.product_name)),
                    Some(p) => AppError::InsufficientStock(format!(
                        "{}: requested {}, available {}",
                        line.product_name, line.quantity, p.available_qty
                    )),
                });
            }
            reserved.push((line.product_id, line.quantity));
        }

        let total_cents = cart_items.iter().map(|it| it.line_total_cents).sum();
        let order = match Order::new(buyer_id.to_string(), delivery, total_cents) {
            Ok(o) => o,
            Err(e) => {
                self.release_reserved(&reserved).await;
                return Err(AppError::InvalidInput(e.to_string()));
            }
        };
        let order_items: Vec<OrderItem> = cart_items
            .iter()
            .map(|it| OrderItem::from_cart_item(order.id, it))
            .collect();

        let order = match self.store.create_order(order, order_items.clone()).await {
            Ok(o) => o,
            Err(e) => {
                self.release_reserved(&reserved).await;
                return Err(e.into());
            }
        };

        // Retire the cart; the order snapshot is now the record. Should the
        // cart fail to leave Active, the order is unwound and the stock
        // released so the buyer cannot end up ordering the same lines twice.
        cart.mark_checked_out();
        cart.apply_totals(&[]);
        if let Err(e) = self.store.save_cart(&cart).await {
            if let Err(del) = self.store.delete_order(order.id).await {
                tracing::error!(order_id = %order.id, error = %del, "failed to unwind order");
            }
            self.release_reserved(&reserved).await;
            return Err(e.into());
        }
        // Once the cart is CheckedOut it can never be checked out again;
        // leftover line rows are invisible and only worth a warning.
        if let Err(e) = self.store.clear_items(cart.id).await {
            tracing::warn!(cart_id = %cart.id, error = %e, "failed to clear checked-out cart");
        }

        tracing::info!(
            order_id = %order.id,
            buyer = buyer_id,
            total_cents,
            lines = order_items.len(),
            "order created from cart"
        );
        Ok((order, order_items))
    }

    async fn release_reserved(&self, reserved: &[(Uuid, u32)]) {
        for (product_id, qty) in reserved {
            if let Err(e) = self.store.release(*product_id, *qty).await {
                tracing::error!(%product_id, qty, error = %e, "failed to release reservation");
            }
        }
    }
}
