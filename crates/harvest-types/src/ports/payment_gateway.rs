use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("unknown payment intent: {0}")]
    UnknownIntent(String),
    #[error("gateway rejected request: {0}")]
    Rejected(String),
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentMetadata {
    pub order_id: Uuid,
    pub buyer_id: String,
}

/// Result of opening an intent with the processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenedIntent {
    pub intent_id: String,
    pub client_secret: String,
    pub status: String,
}

/// The processor's current view of an intent, including the raw payload for
/// audit storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentSnapshot {
    pub status: String,
    pub amount_cents: i64,
    pub currency: String,
    pub raw_payload: serde_json::Value,
}

/// External payment processor. Callers must bound these with a timeout; the
/// adapter itself makes no liveness promises.
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn open_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        metadata: IntentMetadata,
    ) -> Result<OpenedIntent, GatewayError>;

    async fn intent_status(&self, intent_id: &str) -> Result<IntentSnapshot, GatewayError>;
}
