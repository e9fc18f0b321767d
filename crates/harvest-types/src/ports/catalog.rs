use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::product::Product;
use crate::ports::RepoError;

/// Read-and-reserve view of the externally owned product catalog.
#[async_trait]
pub trait Catalog: Send + Sync + 'static {
    async fn product(&self, id: Uuid) -> Result<Option<Product>, RepoError>;

    /// Atomic conditional decrement: take `qty` units only if at least that
    /// many are available. Returns `false` without effect otherwise. This is
    /// the guard that keeps two buyers from both taking the last unit.
    async fn try_reserve(&self, id: Uuid, qty: u32) -> Result<bool, RepoError>;

    /// Reverse a prior reservation (cancellation, or checkout compensation).
    async fn release(&self, id: Uuid, qty: u32) -> Result<(), RepoError>;
}
