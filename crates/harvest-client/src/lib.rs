//! Typed HTTP client for the marketplace checkout API. The buyer's
//! identity rides along as a default header on every request.

use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use harvest_types::domain::cart::{Cart, CartItem};
use harvest_types::domain::order::{Order, OrderItem};
use harvest_types::domain::payment::Payment;

#[derive(Clone)]
pub struct MarketClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

#[derive(Clone)]
pub struct MarketClient {
    base: Url,
    client: reqwest::Client,
}

impl MarketClient {
    pub fn new(base_url: &str, buyer_id: &str) -> anyhow::Result<Self> {
        Self::builder(base_url, buyer_id)?.build()
    }

    pub fn builder(base_url: &str, buyer_id: &str) -> anyhow::Result<MarketClientBuilder> {
        let base = Url::parse(base_url).context("invalid base url")?;
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-buyer-id"),
            HeaderValue::from_str(buyer_id).context("invalid buyer id")?,
        );
        Ok(MarketClientBuilder {
            base,
            headers,
            timeout: None,
            client: None,
        })
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        self.base.join(path).context("failed to join url")
    }

    pub async fn cart(&self) -> anyhow::Result<CartView> {
        let res = self
            .client
            .get(self.url("cart")?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn add_to_cart(&self, product_id: Uuid, quantity: u32) -> anyhow::Result<CartView> {
        let res = self
            .client
            .post(self.url("cart/add")?)
            .json(&CartLineRequest {
                product_id,
                quantity,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn update_cart_item(
        &self,
        product_id: Uuid,
        quantity: u32,
    ) -> anyhow::Result<CartView> {
        let res = self
            .client
            .put(self.url("cart/update")?)
            .json(&CartLineRequest {
                product_id,
                quantity,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn remove_from_cart(&self, product_id: Uuid) -> anyhow::Result<CartView> {
        let res = self
            .client
            .delete(self.url(&format!("cart/remove/{product_id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn clear_cart(&self) -> anyhow::Result<CartView> {
        let res = self
            .client
            .delete(self.url("cart/clear")?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn create_order(&self, delivery: DeliveryDetails) -> anyhow::Result<CreatedOrder> {
        let res = self
            .client
            .post(self.url("checkout/create-order")?)
            .json(&delivery)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn create_payment_intent(&self, order_id: Uuid) -> anyhow::Result<PaymentIntentView> {
        let res = self
            .client
            .post(self.url("checkout/create-payment-intent")?)
            .json(&OrderRef { order_id })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn confirm_payment(
        &self,
        order_id: Uuid,
        payment_intent_id: &str,
    ) -> anyhow::Result<PaymentConfirmation> {
        let res = self
            .client
            .post(self.url("checkout/confirm-payment")?)
            .json(&ConfirmPaymentRequest {
                order_id,
                payment_intent_id: payment_intent_id.to_string(),
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn cancel_order(&self, order_id: Uuid) -> anyhow::Result<Order> {
        let res = self
            .client
            .post(self.url(&format!("checkout/cancel-order/{order_id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn order(&self, order_id: Uuid) -> anyhow::Result<OrderView> {
        let res = self
            .client
            .get(self.url(&format!("checkout/order/{order_id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn orders(&self) -> anyhow::Result<Vec<Order>> {
        let res = self
            .client
            .get(self.url("checkout/orders")?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }
}

impl MarketClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<MarketClient> {
        if let Some(client) = self.client {
            return Ok(MarketClient {
                base: self.base,
                client,
            });
        }

        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(MarketClient {
            base: self.base,
            client,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct CartLineRequest {
    product_id: Uuid,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct OrderRef {
    order_id: Uuid,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ConfirmPaymentRequest {
    order_id: Uuid,
    payment_intent_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeliveryDetails {
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_postal_code: String,
    pub contact_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CartView {
    pub cart: Cart,
    pub items: Vec<CartItem>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreatedOrder {
    pub order: Order,
    pub order_items: Vec<OrderItem>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentIntentView {
    pub payment_intent_id: String,
    pub client_secret: String,
    pub amount_cents: i64,
    pub currency: String,
    pub publishable_key: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentConfirmation {
    pub payment: Payment,
    pub order: Order,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OrderView {
    pub order: Order,
    pub order_items: Vec<OrderItem>,
}
