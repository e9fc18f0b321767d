use std::sync::Arc;

use uuid::Uuid;

use crate::application::buyer_locks::BuyerLocks;
use crate::errors::AppError;
use harvest_types::domain::cart::{Cart, CartItem};
use harvest_types::ports::cart_repository::CartRepository;
use harvest_types::ports::catalog::Catalog;

/// Maintains one active cart per buyer and keeps its totals consistent with
/// its items. All mutation runs under the buyer's lock.
pub struct CartService<S> {
    store: Arc<S>,
    locks: BuyerLocks,
}

impl<S> CartService<S>
where
    S: CartRepository + Catalog,
{
    pub fn new(store: Arc<S>, locks: BuyerLocks) -> Self {
        Self { store, locks }
    }

    /// The buyer's active cart, created lazily on first use.
    async fn get_or_create_active_cart(&self, buyer_id: &str) -> Result<Cart, AppError> {
        if let Some(cart) = self.store.active_cart(buyer_id).await? {
            return Ok(cart);
        }
        Ok(self.store.insert_cart(Cart::new(buyer_id.to_string())).await?)
    }

    pub async fn add_item(
        &self,
        buyer_id: &str,
        product_id: Uuid,
        quantity: u32,
    ) -> Result<CartItem, AppError> {
        if quantity == 0 {
            return Err(AppError::InvalidInput(
                "quantity must be greater than zero".into(),
            ));
        }
        let _guard = self.locks.acquire(buyer_id).await;

        let product = self
            .store
            .product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

        let mut cart = self.get_or_create_active_cart(buyer_id).await?;

        // Repeated adds merge into the existing line for this product.
        let item = match self.store.find_item(cart.id, product_id).await? {
            Some(mut existing) => {
                // An overflowing merge must not wrap and slip past the stock
                // comparison.
                let requested = existing
                    .quantity
                    .checked_add(quantity)
                    .filter(|&q| q <= product.available_qty)
                    .ok_or_else(|| {
                        AppError::InsufficientStock(format!(
                            "{}: requested {} on top of {} in the cart, available {}",
                            product.name, quantity, existing.quantity, product.available_qty
                        ))
                    })?;
                existing.set_quantity(requested);
                existing
            }
            None => {
                if quantity > product.available_qty {
                    return Err(AppError::InsufficientStock(format!(
                        "{}: requested {quantity}, available {}",
                        product.name, product.available_qty
                    )));
                }
                CartItem::new(cart.id, &product, quantity)
            }
        };

        let item = self.store.upsert_item(item).await?;
        self.recompute_totals(&mut cart).await?;
        tracing::debug!(buyer = buyer_id, %product_id, quantity, "added to cart");
        Ok(item)
    }

    pub async fn update_item_quantity(
        &self,
        buyer_id: &str,
        product_id: Uuid,
        quantity: u32,
    ) -> Result<CartItem, AppError> {
        if quantity == 0 {
            return Err(AppError::InvalidInput(
                "quantity must be greater than zero; remove the item instead".into(),
            ));
        }
        let _guard = self.locks.acquire(buyer_id).await;

        let mut cart = self
            .store
            .active_cart(buyer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("active cart for {buyer_id}")))?;
        let mut item = self
            .store
            .find_item(cart.id, product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {product_id} in cart")))?;
        let product = self
            .store
            .product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

        if quantity > product.available_qty {
            return Err(AppError::InsufficientStock(format!(
                "{}: requested {quantity}, available {}",
                product.name, product.available_qty
            )));
        }

        item.set_quantity(quantity);
        let item = self.store.upsert_item(item).await?;
        self.recompute_totals(&mut cart).await?;
        Ok(item)
    }

    /// Idempotent: removing an absent item (or from an absent cart) is a
    /// no-op.
    pub async fn remove_item(&self, buyer_id: &str, product_id: Uuid) -> Result<(), AppError> {
        let _guard = self.locks.acquire(buyer_id).await;
        let Some(mut cart) = self.store.active_cart(buyer_id).await? else {
            return Ok(());
        };
        self.store.delete_item(cart.id, product_id).await?;
        self.recompute_totals(&mut cart).await?;
        Ok(())
    }

    /// Delete all items and zero the totals. The cart row itself is kept.
    pub async fn clear(&self, buyer_id: &str) -> Result<(), AppError> {
        let _guard = self.locks.acquire(buyer_id).await;
        let Some(mut cart) = self.store.active_cart(buyer_id).await? else {
            return Ok(());
        };
        self.store.clear_items(cart.id).await?;
        cart.apply_totals(&[]);
        self.store.save_cart(&cart).await?;
        Ok(())
    }

    /// Carts come into existence on first add, so a buyer without one gets
    /// an empty unpersisted view rather than a fresh row.
    pub async fn summary(&self, buyer_id: &str) -> Result<(Cart, Vec<CartItem>), AppError> {
        let _guard = self.locks.acquire(buyer_id).await;
        let Some(cart) = self.store.active_cart(buyer_id).await? else {
            return Ok((Cart::new(buyer_id.to_string()), Vec::new()));
        };
        let items = self.store.cart_items(cart.id).await?;
        Ok((cart, items))
    }

    /// Totals are recalculated from the full item set after every mutation,
    /// never adjusted incrementally.
    async fn recompute_totals(&self, cart: &mut Cart) -> Result<(), AppError> {
        let items = self.store.cart_items(cart.id).await?;
        cart.apply_totals(&items);
        self.store.save_cart(cart).await?;
        Ok(())
    }
}
