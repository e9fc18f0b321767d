use axum::{
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    routing::{delete, get, post, put},
    serve, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::buyer_locks::BuyerLocks;
use crate::application::cart_service::CartService;
use crate::application::checkout_service::CheckoutService;
use crate::application::order_service::OrderLifecycle;
use crate::application::payment_service::{PaymentIntent, PaymentService};
use crate::config::Config;
use crate::errors::AppError;
use harvest_types::domain::cart::{Cart, CartItem};
use harvest_types::domain::order::{Delivery, Order, OrderItem, PaymentStatus};
use harvest_types::domain::payment::{Payment, PaymentState};
use harvest_types::ports::payment_gateway::PaymentGateway;
use harvest_types::ports::MarketStore;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
}

/// Everything the handlers need, bundled as the router state. The cart and
/// checkout services share one lock table so a buyer's cart edits and
/// checkout serialize against each other.
pub struct AppState<S, G> {
    pub carts: Arc<CartService<S>>,
    pub checkout: Arc<CheckoutService<S>>,
    pub payments: Arc<PaymentService<S, G>>,
    pub orders: Arc<OrderLifecycle<S>>,
    pub publishable_key: String,
}

impl<S, G> Clone for AppState<S, G> {
    fn clone(&self) -> Self {
        Self {
            carts: self.carts.clone(),
            checkout: self.checkout.clone(),
            payments: self.payments.clone(),
            orders: self.orders.clone(),
            publishable_key: self.publishable_key.clone(),
        }
    }
}

impl<S, G> AppState<S, G>
where
    S: MarketStore,
    G: PaymentGateway,
{
    pub fn new(store: Arc<S>, gateway: Arc<G>, cfg: &Config) -> Self {
        let locks = BuyerLocks::new();
        Self {
            carts: Arc::new(CartService::new(store.clone(), locks.clone())),
            checkout: Arc::new(CheckoutService::new(store.clone(), locks)),
            payments: Arc::new(PaymentService::new(
                store.clone(),
                gateway,
                cfg.currency.clone(),
                Duration::from_millis(cfg.gateway_timeout_ms),
            )),
            orders: Arc::new(OrderLifecycle::new(store)),
            publishable_key: cfg.publishable_key.clone(),
        }
    }
}

/// The caller's identity, taken from the `x-buyer-id` header. Requests
/// without it are turned away before any handler runs.
pub struct BuyerIdentity(pub String);

impl<S> FromRequestParts<S> for BuyerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get("x-buyer-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Unauthorized("missing x-buyer-id header".into()))?;
        Ok(BuyerIdentity(value.to_string()))
    }
}

#[derive(Deserialize)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_postal_code: String,
    pub contact_phone: String,
    pub instructions: Option<String>,
}

impl CreateOrderRequest {
    fn into_delivery(self) -> Delivery {
        Delivery {
            address: self.delivery_address,
            city: self.delivery_city,
            postal_code: self.delivery_postal_code,
            contact_phone: self.contact_phone,
            instructions: self.instructions,
        }
    }
}

#[derive(Serialize)]
pub struct CreateOrderResponse {
    pub order: Order,
    pub order_items: Vec<OrderItem>,
}

#[derive(Deserialize)]
pub struct PaymentIntentRequest {
    pub order_id: Uuid,
}

#[derive(Serialize)]
pub struct PaymentIntentResponse {
    pub payment_intent_id: String,
    pub client_secret: String,
    pub amount_cents: i64,
    pub currency: String,
    pub publishable_key: String,
}

#[derive(Deserialize)]
pub struct ConfirmPaymentRequest {
    pub order_id: Uuid,
    pub payment_intent_id: String,
}

#[derive(Serialize)]
pub struct ConfirmPaymentResponse {
    pub payment: Payment,
    pub order: Order,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub cart: Cart,
    pub items: Vec<CartItem>,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub order: Order,
    pub order_items: Vec<OrderItem>,
}

#[derive(Clone)]
pub struct HttpServer<S, G> {
    pub state: AppState<S, G>,
    pub config: HttpServerConfig,
}

impl<S, G> HttpServer<S, G>
where
    S: MarketStore,
    G: PaymentGateway,
{
    pub fn new(state: AppState<S, G>, config: HttpServerConfig) -> Self {
        Self { state, config }
    }

    pub fn router(state: AppState<S, G>) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        Router::new()
            .route("/health", get(health))
            .route("/cart", get(get_cart::<S, G>))
            .route("/cart/add", post(add_to_cart::<S, G>))
            .route("/cart/update", put(update_cart::<S, G>))
            .route("/cart/remove/{product_id}", delete(remove_from_cart::<S, G>))
            .route("/cart/clear", delete(clear_cart::<S, G>))
            .route("/checkout/create-order", post(create_order::<S, G>))
            .route(
                "/checkout/create-payment-intent",
                post(create_payment_intent::<S, G>),
            )
            .route("/checkout/confirm-payment", post(confirm_payment::<S, G>))
            .route(
                "/checkout/cancel-order/{order_id}",
                post(cancel_order::<S, G>),
            )
            .route("/checkout/order/{order_id}", get(get_order::<S, G>))
            .route("/checkout/orders", get(list_orders::<S, G>))
            .layer(trace_layer)
            // Storefront runs in the browser on a different origin.
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let app = Self::router(self.state);
        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        tracing::info!("starting server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

async fn health() -> (axum::http::StatusCode, Json<serde_json::Value>) {
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({ "status": "ok" })),
    )
}

async fn get_cart<S, G>(
    State(state): State<AppState<S, G>>,
    BuyerIdentity(buyer): BuyerIdentity,
) -> Result<Json<CartResponse>, AppError>
where
    S: MarketStore,
    G: PaymentGateway,
{
    let (cart, items) = state.carts.summary(&buyer).await?;
    Ok(Json(CartResponse { cart, items }))
}

async fn add_to_cart<S, G>(
    State(state): State<AppState<S, G>>,
    BuyerIdentity(buyer): BuyerIdentity,
    Json(payload): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>, AppError>
where
    S: MarketStore,
    G: PaymentGateway,
{
    state
        .carts
        .add_item(&buyer, payload.product_id, payload.quantity)
        .await?;
    let (cart, items) = state.carts.summary(&buyer).await?;
    Ok(Json(CartResponse { cart, items }))
}

async fn update_cart<S, G>(
    State(state): State<AppState<S, G>>,
    BuyerIdentity(buyer): BuyerIdentity,
    Json(payload): Json<UpdateCartRequest>,
) -> Result<Json<CartResponse>, AppError>
where
    S: MarketStore,
    G: PaymentGateway,
{
    state
        .carts
        .update_item_quantity(&buyer, payload.product_id, payload.quantity)
        .await?;
    let (cart, items) = state.carts.summary(&buyer).await?;
    Ok(Json(CartResponse { cart, items }))
}

async fn remove_from_cart<S, G>(
    State(state): State<AppState<S, G>>,
    BuyerIdentity(buyer): BuyerIdentity,
    Path(product_id): Path<Uuid>,
) -> Result<Json<CartResponse>, AppError>
where
    S: MarketStore,
    G: PaymentGateway,
{
    state.carts.remove_item(&buyer, product_id).await?;
    let (cart, items) = state.carts.summary(&buyer).await?;
    Ok(Json(CartResponse { cart, items }))
}

async fn clear_cart<S, G>(
    State(state): State<AppState<S, G>>,
    BuyerIdentity(buyer): BuyerIdentity,
) -> Result<Json<CartResponse>, AppError>
where
    S: MarketStore,
    G: PaymentGateway,
{
    state.carts.clear(&buyer).await?;
    let (cart, items) = state.carts.summary(&buyer).await?;
    Ok(Json(CartResponse { cart, items }))
}

async fn create_order<S, G>(
    State(state): State<AppState<S, G>>,
    BuyerIdentity(buyer): BuyerIdentity,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<CreateOrderResponse>), AppError>
where
    S: MarketStore,
    G: PaymentGateway,
{
    let (order, order_items) = state
        .checkout
        .create_order_from_cart(&buyer, payload.into_delivery())
        .await?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(CreateOrderResponse { order, order_items }),
    ))
}

async fn create_payment_intent<S, G>(
    State(state): State<AppState<S, G>>,
    BuyerIdentity(buyer): BuyerIdentity,
    Json(payload): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, AppError>
where
    S: MarketStore,
    G: PaymentGateway,
{
    let PaymentIntent {
        payment_intent_id,
        client_secret,
        amount_cents,
        currency,
    } = state
        .payments
        .create_payment_intent(&buyer, payload.order_id)
        .await?;
    Ok(Json(PaymentIntentResponse {
        payment_intent_id,
        client_secret,
        amount_cents,
        currency,
        publishable_key: state.publishable_key.clone(),
    }))
}

async fn confirm_payment<S, G>(
    State(state): State<AppState<S, G>>,
    BuyerIdentity(buyer): BuyerIdentity,
    Json(payload): Json<ConfirmPaymentRequest>,
) -> Result<Json<ConfirmPaymentResponse>, AppError>
where
    S: MarketStore,
    G: PaymentGateway,
{
    let payment = state
        .payments
        .process_payment(&buyer, payload.order_id, &payload.payment_intent_id)
        .await?;

    let order = match payment.state {
        PaymentState::Completed => {
            state
                .orders
                .apply_payment_outcome(payload.order_id, PaymentStatus::Paid, Some(payment.id))
                .await?
        }
        PaymentState::Failed => {
            state
                .orders
                .apply_payment_outcome(payload.order_id, PaymentStatus::Failed, Some(payment.id))
                .await?
        }
        _ => {
            let (order, _) = state.orders.order_with_items(&buyer, payload.order_id).await?;
            order
        }
    };

    Ok(Json(ConfirmPaymentResponse { payment, order }))
}

async fn cancel_order<S, G>(
    State(state): State<AppState<S, G>>,
    BuyerIdentity(buyer): BuyerIdentity,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, AppError>
where
    S: MarketStore,
    G: PaymentGateway,
{
    let order = state.orders.cancel_order(&buyer, order_id).await?;
    Ok(Json(order))
}

async fn get_order<S, G>(
    State(state): State<AppState<S, G>>,
    BuyerIdentity(buyer): BuyerIdentity,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError>
where
    S: MarketStore,
    G: PaymentGateway,
{
    let (order, order_items) = state.orders.order_with_items(&buyer, order_id).await?;
    Ok(Json(OrderResponse { order, order_items }))
}

async fn list_orders<S, G>(
    State(state): State<AppState<S, G>>,
    BuyerIdentity(buyer): BuyerIdentity,
) -> Result<Json<Vec<Order>>, AppError>
where
    S: MarketStore,
    G: PaymentGateway,
{
    let orders = state.orders.orders_for(&buyer).await?;
    Ok(Json(orders))
}
