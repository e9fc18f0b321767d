pub mod cart_repository;
pub mod catalog;
pub mod order_repository;
pub mod payment_gateway;
pub mod payment_repository;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("db error: {0}")]
    DbError(String),
}

/// Everything the storage layer must provide for the full pipeline.
/// Blanket-implemented so a single backend struct satisfies it.
pub trait MarketStore:
    cart_repository::CartRepository
    + order_repository::OrderRepository
    + payment_repository::PaymentRepository
    + catalog::Catalog
{
}

impl<T> MarketStore for T where
    T: cart_repository::CartRepository
        + order_repository::OrderRepository
        + payment_repository::PaymentRepository
        + catalog::Catalog
{
}
