use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentState {
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

impl PaymentState {
    /// Map a gateway intent status onto the local state. Anything the
    /// gateway does not positively vouch for is treated as failed.
    pub fn from_gateway_status(status: &str) -> Self {
        match status {
            "succeeded" => PaymentState::Completed,
            "processing" => PaymentState::Processing,
            s if s.starts_with("requires_") => PaymentState::Pending,
            _ => PaymentState::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PaymentState::Completed | PaymentState::Failed | PaymentState::Refunded
        )
    }
}

/// One attempt to collect funds for an order. Retries create new rows
/// rather than overwriting, so the payment history stays auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub buyer_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub method: String,
    pub gateway: String,
    pub state: PaymentState,
    pub transaction_id: Option<String>,
    pub gateway_response: Option<serde_json::Value>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        order_id: Uuid,
        buyer_id: String,
        amount_cents: i64,
        currency: String,
        method: String,
        gateway: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            order_id,
            buyer_id,
            amount_cents,
            currency,
            method,
            gateway,
            state: PaymentState::Pending,
            transaction_id: None,
            gateway_response: None,
            failure_reason: None,
            created_at: now,
            processed_at: None,
            updated_at: now,
        }
    }

    /// Apply the verified gateway outcome to this attempt.
    pub fn resolve(
        &mut self,
        state: PaymentState,
        transaction_id: Option<String>,
        gateway_response: Option<serde_json::Value>,
        failure_reason: Option<String>,
    ) {
        self.state = state;
        self.transaction_id = transaction_id;
        self.gateway_response = gateway_response;
        self.failure_reason = failure_reason;
        let now = Utc::now();
        if state.is_terminal() {
            self.processed_at = Some(now);
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_status_mapping() {
        assert_eq!(
            PaymentState::from_gateway_status("succeeded"),
            PaymentState::Completed
        );
        assert_eq!(
            PaymentState::from_gateway_status("processing"),
            PaymentState::Processing
        );
        assert_eq!(
            PaymentState::from_gateway_status("requires_payment_method"),
            PaymentState::Pending
        );
        assert_eq!(
            PaymentState::from_gateway_status("requires_action"),
            PaymentState::Pending
        );
        // Unknown statuses fail closed.
        assert_eq!(
            PaymentState::from_gateway_status("canceled"),
            PaymentState::Failed
        );
        assert_eq!(PaymentState::from_gateway_status(""), PaymentState::Failed);
    }

    #[test]
    fn resolve_sets_processed_at_only_for_terminal_states() {
        let mut p = Payment::new(
            Uuid::new_v4(),
            "buyer@example.com".into(),
            1000,
            "LKR".into(),
            "CARD".into(),
            "STRIPE".into(),
        );
        p.resolve(PaymentState::Processing, Some("pi_1".into()), None, None);
        assert!(p.processed_at.is_none());

        p.resolve(PaymentState::Completed, Some("pi_1".into()), None, None);
        assert!(p.processed_at.is_some());
        assert_eq!(p.state, PaymentState::Completed);
    }

    #[test]
    fn failed_resolution_keeps_reason() {
        let mut p = Payment::new(
            Uuid::new_v4(),
            "buyer@example.com".into(),
            1000,
            "LKR".into(),
            "CARD".into(),
            "STRIPE".into(),
        );
        p.resolve(
            PaymentState::Failed,
            Some("pi_2".into()),
            None,
            Some("card declined".into()),
        );
        assert_eq!(p.state, PaymentState::Failed);
        assert_eq!(p.failure_reason.as_deref(), Some("card declined"));
    }
}
