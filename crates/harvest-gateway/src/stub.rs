use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use harvest_types::ports::payment_gateway::{
    GatewayError, IntentMetadata, IntentSnapshot, OpenedIntent, PaymentGateway,
};

#[derive(Debug, Clone)]
struct StubIntent {
    status: String,
    amount_cents: i64,
    currency: String,
    metadata: IntentMetadata,
}

/// In-memory payment processor. New intents open in
/// `requires_payment_method`; tests and local runs move them along with
/// [`StubGateway::settle`] / [`StubGateway::fail`]. The `unavailable` switch
/// simulates an outage: every call errors without touching intent state.
#[derive(Clone, Default)]
pub struct StubGateway {
    intents: Arc<DashMap<String, StubIntent>>,
    unavailable: Arc<AtomicBool>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the simulated outage on or off.
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    /// Card accepted: intent moves to `succeeded`.
    pub fn settle(&self, intent_id: &str) {
        if let Some(mut intent) = self.intents.get_mut(intent_id) {
            intent.status = "succeeded".into();
        }
    }

    /// Card declined (or any processor-side failure status).
    pub fn fail(&self, intent_id: &str, status: &str) {
        if let Some(mut intent) = self.intents.get_mut(intent_id) {
            intent.status = status.into();
        }
    }

    /// Intent stuck mid-capture.
    pub fn mark_processing(&self, intent_id: &str) {
        if let Some(mut intent) = self.intents.get_mut(intent_id) {
            intent.status = "processing".into();
        }
    }

    fn check_up(&self) -> Result<(), GatewayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable(
                "stub gateway is offline".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn open_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        metadata: IntentMetadata,
    ) -> Result<OpenedIntent, GatewayError> {
        self.check_up()?;
        if amount_cents <= 0 {
            return Err(GatewayError::Rejected("amount must be positive".into()));
        }

        let intent_id = format!("pi_{}", Uuid::new_v4().simple());
        let client_secret = format!("{}_secret_{}", intent_id, Uuid::new_v4().simple());
        let status = "requires_payment_method".to_string();

        tracing::debug!(%intent_id, amount_cents, currency, "opened payment intent");
        self.intents.insert(
            intent_id.clone(),
            StubIntent {
                status: status.clone(),
                amount_cents,
                currency: currency.to_string(),
                metadata,
            },
        );

        Ok(OpenedIntent {
            intent_id,
            client_secret,
            status,
        })
    }

    async fn intent_status(&self, intent_id: &str) -> Result<IntentSnapshot, GatewayError> {
        self.check_up()?;
        let intent = self
            .intents
            .get(intent_id)
            .ok_or_else(|| GatewayError::UnknownIntent(intent_id.to_string()))?;

        Ok(IntentSnapshot {
            status: intent.status.clone(),
            amount_cents: intent.amount_cents,
            currency: intent.currency.clone(),
            raw_payload: serde_json::json!({
                "id": intent_id,
                "status": intent.status,
                "amount": intent.amount_cents,
                "currency": intent.currency,
                "metadata": {
                    "order_id": intent.metadata.order_id,
                    "buyer_id": intent.metadata.buyer_id,
                },
            }),
        })
    }
}
