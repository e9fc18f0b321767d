use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::Product;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CartStatus {
    Active,
    CheckedOut,
    Abandoned,
}

/// A buyer's in-progress collection of intended purchases. At most one
/// `Active` cart exists per buyer; totals are always derived from the
/// current item set via [`Cart::apply_totals`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,
    pub buyer_id: String,
    pub total_cents: i64,
    pub total_items: u32,
    pub status: CartStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(buyer_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            buyer_id,
            total_cents: 0,
            total_items: 0,
            status: CartStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recompute totals from the full item set. Authoritative: totals are
    /// never adjusted incrementally, so a partial failure cannot leave them
    /// drifted from the items.
    pub fn apply_totals(&mut self, items: &[CartItem]) {
        self.total_cents = items.iter().map(|it| it.line_total_cents).sum();
        self.total_items = items.iter().map(|it| it.quantity).sum();
        self.updated_at = Utc::now();
    }

    pub fn mark_checked_out(&mut self) {
        self.status = CartStatus::CheckedOut;
        self.updated_at = Utc::now();
    }
}

/// One product line within a cart, keyed by `(cart_id, product_id)`.
/// Carries a snapshot of the product taken at add-time so the buyer keeps
/// the price they saw even if the listing changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub farmer_id: String,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub category: String,
    pub image_ref: Option<String>,
    pub quantity: u32,
    pub line_total_cents: i64,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    pub fn new(cart_id: Uuid, product: &Product, quantity: u32) -> Self {
        let now = Utc::now();
        Self {
            cart_id,
            product_id: product.id,
            farmer_id: product.farmer_id.clone(),
            product_name: product.name.clone(),
            unit_price_cents: product.price_cents,
            category: product.category.clone(),
            image_ref: product.image_ref.clone(),
            quantity,
            line_total_cents: product.price_cents * quantity as i64,
            added_at: now,
            updated_at: now,
        }
    }

    /// Change the quantity, recomputing the line total from the snapshotted
    /// unit price.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.line_total_cents = self.unit_price_cents * quantity as i64;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price_cents: i64) -> Product {
        Product {
            id: Uuid::new_v4(),
            farmer_id: "farmer-1".into(),
            name: "Red Rice".into(),
            price_cents,
            category: "Grains".into(),
            image_ref: None,
            available_qty: 10,
        }
    }

    #[test]
    fn new_cart_is_active_and_zeroed() {
        let cart = Cart::new("buyer@example.com".into());
        assert_eq!(cart.status, CartStatus::Active);
        assert_eq!(cart.total_cents, 0);
        assert_eq!(cart.total_items, 0);
    }

    #[test]
    fn apply_totals_sums_lines_and_quantities() {
        let mut cart = Cart::new("buyer@example.com".into());
        let p1 = product(200);
        let p2 = product(350);
        let items = vec![
            CartItem::new(cart.id, &p1, 3),
            CartItem::new(cart.id, &p2, 2),
        ];
        cart.apply_totals(&items);
        assert_eq!(cart.total_cents, 600 + 700);
        assert_eq!(cart.total_items, 5);

        cart.apply_totals(&[]);
        assert_eq!(cart.total_cents, 0);
        assert_eq!(cart.total_items, 0);
    }

    #[test]
    fn set_quantity_recomputes_line_total() {
        let p = product(200);
        let mut item = CartItem::new(Uuid::new_v4(), &p, 3);
        assert_eq!(item.line_total_cents, 600);
        item.set_quantity(5);
        assert_eq!(item.quantity, 5);
        assert_eq!(item.line_total_cents, 1000);
    }

    #[test]
    fn item_snapshot_survives_product_change() {
        let mut p = product(200);
        let item = CartItem::new(Uuid::new_v4(), &p, 1);
        p.price_cents = 999;
        assert_eq!(item.unit_price_cents, 200);
    }
}
