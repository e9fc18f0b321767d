use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartItem};
use crate::ports::RepoError;

#[async_trait]
pub trait CartRepository: Send + Sync + 'static {
    /// The buyer's `Active` cart, if any.
    async fn active_cart(&self, buyer_id: &str) -> Result<Option<Cart>, RepoError>;
    async fn insert_cart(&self, cart: Cart) -> Result<Cart, RepoError>;
    async fn save_cart(&self, cart: &Cart) -> Result<(), RepoError>;
    async fn cart_items(&self, cart_id: Uuid) -> Result<Vec<CartItem>, RepoError>;
    async fn find_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartItem>, RepoError>;
    /// Insert or replace the line for `(item.cart_id, item.product_id)`.
    async fn upsert_item(&self, item: CartItem) -> Result<CartItem, RepoError>;
    async fn delete_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<bool, RepoError>;
    async fn clear_items(&self, cart_id: Uuid) -> Result<(), RepoError>;
}
