use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use harvest_types::domain::order::{Order, OrderStatus};
use harvest_types::domain::payment::{Payment, PaymentState};
use harvest_types::ports::order_repository::OrderRepository;
use harvest_types::ports::payment_gateway::{IntentMetadata, PaymentGateway};
use harvest_types::ports::payment_repository::PaymentRepository;

/// What the browser needs to drive the card form.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntent {
    pub payment_intent_id: String,
    pub client_secret: String,
    pub amount_cents: i64,
    pub currency: String,
}

/// Opens gateway intents and verifies their outcome. Every gateway call is
/// wrapped in a timeout; a verification that cannot complete records nothing,
/// so the buyer can simply retry.
pub struct PaymentService<S, G> {
    store: Arc<S>,
    gateway: Arc<G>,
    currency: String,
    gateway_timeout: Duration,
}

impl<S, G> PaymentService<S, G>
where
    S: OrderRepository + PaymentRepository,
    G: PaymentGateway,
{
    pub fn new(store: Arc<S>, gateway: Arc<G>, currency: String, gateway_timeout: Duration) -> Self {
        Self {
            store,
            gateway,
            currency,
            gateway_timeout,
        }
    }

    async fn owned_order(&self, buyer_id: &str, order_id: Uuid) -> Result<Order, AppError> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
        if order.customer_id != buyer_id {
            return Err(AppError::Unauthorized(format!(
                "order {order_id} does not belong to this buyer"
            )));
        }
        Ok(order)
    }

    /// Opens an intent for the order's stored total. The amount never comes
    /// from the caller.
    pub async fn create_payment_intent(
        &self,
        buyer_id: &str,
        order_id: Uuid,
    ) -> Result<PaymentIntent, AppError> {
        let order = self.owned_order(buyer_id, order_id).await?;
        // A cancelled order has already given its stock back; nothing past
        // Pending still wants a new intent.
        if order.status != OrderStatus::Pending {
            return Err(AppError::InvalidStateTransition(format!(
                "order {order_id} is {:?} and cannot take a new payment",
                order.status
            )));
        }

        let metadata = IntentMetadata {
            order_id: order.id,
            buyer_id: buyer_id.to_string(),
        };
        let opened = tokio::time::timeout(
            self.gateway_timeout,
            self.gateway
                .open_intent(order.total_cents, &self.currency, metadata),
        )
        .await
        .map_err(|_| AppError::Gateway("payment gateway timed out".into()))??;

        tracing::info!(
            order_id = %order.id,
            intent_id = %opened.intent_id,
            amount_cents = order.total_cents,
            "payment intent opened"
        );
        Ok(PaymentIntent {
            payment_intent_id: opened.intent_id,
            client_secret: opened.client_secret,
            amount_cents: order.total_cents,
            currency: self.currency.clone(),
        })
    }

    /// Asks the gateway what became of an intent and records one payment row
    /// for the attempt. Unknown statuses and amount mismatches fail closed.
    pub async fn process_payment(
        &self,
        buyer_id: &str,
        order_id: Uuid,
        payment_intent_id: &str,
    ) -> Result<Payment, AppError> {
        let order = self.owned_order(buyer_id, order_id).await?;

        let snapshot = tokio::time::timeout(
            self.gateway_timeout,
            self.gateway.intent_status(payment_intent_id),
        )
        .await
        .map_err(|_| AppError::Gateway("payment gateway timed out".into()))??;

        let mut state = PaymentState::from_gateway_status(&snapshot.status);
        let mut failure_reason = match state {
            PaymentState::Failed => {
                Some(format!("gateway reported status '{}'", snapshot.status))
            }
            _ => None,
        };
        if state == PaymentState::Completed && snapshot.amount_cents != order.total_cents {
            state = PaymentState::Failed;
            failure_reason = Some(format!(
                "amount mismatch: gateway charged {} but order total is {}",
                snapshot.amount_cents, order.total_cents
            ));
        }

        let mut payment = Payment::new(
            order.id,
            buyer_id.to_string(),
            order.total_cents,
            self.currency.clone(),
            "CARD".to_string(),
            "STRIPE".to_string(),
        );
        payment.resolve(
            state,
            Some(payment_intent_id.to_string()),
            Some(snapshot.raw_payload),
            failure_reason,
        );
        let payment = self.store.insert_payment(payment).await?;

        tracing::info!(
            order_id = %order.id,
            payment_id = %payment.id,
            state = ?payment.state,
            "payment attempt recorded"
        );
        Ok(payment)
    }

    /// Refunds a completed payment and flags the order as refunded.
    pub async fn refund_payment(&self, payment_id: Uuid) -> Result<Payment, AppError> {
        let mut payment = self
            .store
            .payment(payment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("payment {payment_id}")))?;
        if payment.state != PaymentState::Completed {
            return Err(AppError::InvalidStateTransition(format!(
                "only completed payments can be refunded, this one is {:?}",
                payment.state
            )));
        }

        payment.resolve(PaymentState::Refunded, payment.transaction_id.clone(), None, None);
        self.store.save_payment(&payment).await?;

        if let Some(mut order) = self.store.order(payment.order_id).await? {
            order.record_payment(
                harvest_types::domain::order::PaymentStatus::Refunded,
                Some(payment.id),
            );
            self.store.save_order(&order).await?;
        }

        tracing::info!(payment_id = %payment.id, order_id = %payment.order_id, "payment refunded");
        Ok(payment)
    }
}
