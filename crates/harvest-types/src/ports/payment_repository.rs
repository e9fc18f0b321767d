use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::payment::Payment;
use crate::ports::RepoError;

#[async_trait]
pub trait PaymentRepository: Send + Sync + 'static {
    async fn insert_payment(&self, payment: Payment) -> Result<Payment, RepoError>;
    async fn payment(&self, id: Uuid) -> Result<Option<Payment>, RepoError>;
    async fn save_payment(&self, payment: &Payment) -> Result<(), RepoError>;
    async fn payments_for_order(&self, order_id: Uuid) -> Result<Vec<Payment>, RepoError>;
}
