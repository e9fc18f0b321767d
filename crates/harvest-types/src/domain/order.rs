use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cart::CartItem;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Forward edges of the fulfillment pipeline, plus the single
    /// cancellation edge out of `Pending`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Processing)
                | (Processing, Shipped)
                | (Shipped, Delivered)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderItemStatus {
    Pending,
    Fulfilled,
    Cancelled,
}

/// Delivery details captured at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub contact_phone: String,
    pub instructions: Option<String>,
}

/// An immutable record of a completed checkout. Only the status axes (and
/// the payment reference) change after creation; total and items never do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: String,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<Uuid>,
    pub delivery: Delivery,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(customer_id: String, delivery: Delivery, total_cents: i64) -> anyhow::Result<Self> {
        if customer_id.trim().is_empty() {
            anyhow::bail!("customer_id empty");
        }
        if delivery.address.trim().is_empty() {
            anyhow::bail!("delivery address empty");
        }
        if delivery.city.trim().is_empty() {
            anyhow::bail!("delivery city empty");
        }
        if delivery.postal_code.trim().is_empty() {
            anyhow::bail!("delivery postal code empty");
        }
        if delivery.contact_phone.trim().is_empty() {
            anyhow::bail!("contact phone empty");
        }
        if total_cents <= 0 {
            anyhow::bail!("order total must be positive");
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            customer_id,
            total_cents,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_id: None,
            delivery,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn transition_to(&mut self, next: OrderStatus) -> anyhow::Result<()> {
        if !self.status.can_transition_to(next) {
            anyhow::bail!("order cannot move from {:?} to {:?}", self.status, next);
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Record a payment outcome. A `Paid` outcome moves a still-pending
    /// order forward to `Confirmed` so paid orders are distinguishable from
    /// abandoned ones.
    pub fn record_payment(&mut self, outcome: PaymentStatus, payment_id: Option<Uuid>) {
        self.payment_status = outcome;
        if payment_id.is_some() {
            self.payment_id = payment_id;
        }
        if outcome == PaymentStatus::Paid && self.status == OrderStatus::Pending {
            self.status = OrderStatus::Confirmed;
        }
        self.updated_at = Utc::now();
    }
}

/// One product line within an order: a frozen copy of a cart line at
/// checkout time. Survives later price or stock changes to the listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub farmer_id: String,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub category: String,
    pub image_ref: Option<String>,
    pub quantity: u32,
    pub line_total_cents: i64,
    pub status: OrderItemStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn from_cart_item(order_id: Uuid, item: &CartItem) -> Self {
        Self {
            order_id,
            product_id: item.product_id,
            farmer_id: item.farmer_id.clone(),
            product_name: item.product_name.clone(),
            unit_price_cents: item.unit_price_cents,
            category: item.category.clone(),
            image_ref: item.image_ref.clone(),
            quantity: item.quantity,
            line_total_cents: item.line_total_cents,
            status: OrderItemStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery() -> Delivery {
        Delivery {
            address: "12 Paddy Lane".into(),
            city: "Kandy".into(),
            postal_code: "20000".into(),
            contact_phone: "+94 77 123 4567".into(),
            instructions: None,
        }
    }

    #[test]
    fn new_order_defaults_to_pending_on_both_axes() {
        let order = Order::new("buyer@example.com".into(), delivery(), 1000).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert!(order.payment_id.is_none());
    }

    #[test]
    fn validation_errors() {
        assert!(Order::new("".into(), delivery(), 1000).is_err());

        let mut d = delivery();
        d.address = "  ".into();
        assert!(Order::new("b@example.com".into(), d, 1000).is_err());

        let mut d = delivery();
        d.contact_phone = "".into();
        assert!(Order::new("b@example.com".into(), d, 1000).is_err());

        assert!(Order::new("b@example.com".into(), delivery(), 0).is_err());
    }

    #[test]
    fn fulfillment_pipeline_moves_forward_only() {
        let mut order = Order::new("b@example.com".into(), delivery(), 500).unwrap();
        order.transition_to(OrderStatus::Confirmed).unwrap();
        order.transition_to(OrderStatus::Processing).unwrap();
        order.transition_to(OrderStatus::Shipped).unwrap();
        order.transition_to(OrderStatus::Delivered).unwrap();

        assert!(order.transition_to(OrderStatus::Pending).is_err());
    }

    #[test]
    fn cancellation_only_from_pending() {
        let mut order = Order::new("b@example.com".into(), delivery(), 500).unwrap();
        order.transition_to(OrderStatus::Confirmed).unwrap();
        assert!(order.transition_to(OrderStatus::Cancelled).is_err());

        let mut fresh = Order::new("b@example.com".into(), delivery(), 500).unwrap();
        fresh.transition_to(OrderStatus::Cancelled).unwrap();
        assert_eq!(fresh.status, OrderStatus::Cancelled);
    }

    #[test]
    fn paid_outcome_confirms_a_pending_order() {
        let mut order = Order::new("b@example.com".into(), delivery(), 500).unwrap();
        let pid = Uuid::new_v4();
        order.record_payment(PaymentStatus::Paid, Some(pid));
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.payment_id, Some(pid));
    }

    #[test]
    fn failed_outcome_does_not_advance_order() {
        let mut order = Order::new("b@example.com".into(), delivery(), 500).unwrap();
        order.record_payment(PaymentStatus::Failed, None);
        assert_eq!(order.payment_status, PaymentStatus::Failed);
        assert_eq!(order.status, OrderStatus::Pending);
    }
}
