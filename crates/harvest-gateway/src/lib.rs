//! harvest-gateway: outbound payment-processor adapters.
//!
//! Ships a [`stub::StubGateway`] that keeps intents in memory and speaks the
//! processor's status vocabulary (`requires_payment_method`, `processing`,
//! `succeeded`, ...). Local runs and tests drive it through its settle/fail
//! hooks; a hosted-processor adapter would implement the same port.

pub mod stub;

pub use stub::StubGateway;
