use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only catalog view of a product listing. The catalog itself is owned
/// by the farmer-facing subsystem; the checkout pipeline only reads it and
/// reserves quantity at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub farmer_id: String,
    pub name: String,
    pub price_cents: i64,
    pub category: String,
    pub image_ref: Option<String>,
    pub available_qty: u32,
}
