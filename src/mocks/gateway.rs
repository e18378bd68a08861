//! Scriptable mock payment gateway for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::config::CHECKOUT_CURRENCY;
use crate::error::{PlazaError, PlazaResult};
use crate::money::Money;
use crate::traits::PaymentGateway;

/// What `capture_order` should do next.
#[derive(Debug, Clone)]
enum CaptureBehavior {
    /// Complete the order and report the order's own amount captured.
    Succeed,
    /// Return a gateway error carrying the given provider body.
    Fail(Value),
    /// Return a success payload whose status is not `COMPLETED`.
    Status(String),
}

#[derive(Debug, Clone)]
struct MockOrder {
    listing_id: String,
    amount: Money,
    status: String,
    captured_value: Option<String>,
}

#[derive(Debug)]
struct MockGatewayInner {
    next_id: AtomicU64,
    orders: RwLock<HashMap<String, MockOrder>>,
    capture_behavior: RwLock<CaptureBehavior>,
    fail_create: RwLock<bool>,
    fail_get: RwLock<bool>,
    created_orders: RwLock<Vec<(String, Money)>>,
    capture_calls: RwLock<Vec<String>>,
}

/// Mock payment gateway.
///
/// Orders start in `CREATED` status; tests script completions, capture
/// refusals, and outage modes, and can inspect every call made.
#[derive(Debug, Clone)]
pub struct MockGateway {
    inner: Arc<MockGatewayInner>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MockGatewayInner {
                next_id: AtomicU64::new(1),
                orders: RwLock::new(HashMap::new()),
                capture_behavior: RwLock::new(CaptureBehavior::Succeed),
                fail_create: RwLock::new(false),
                fail_get: RwLock::new(false),
                created_orders: RwLock::new(Vec::new()),
                capture_calls: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Make `create_order` fail (order-creation outage).
    pub async fn fail_create_order(&self, fail: bool) {
        *self.inner.fail_create.write().await = fail;
    }

    /// Make `get_order` fail (lookup outage).
    pub async fn fail_get_order(&self, fail: bool) {
        *self.inner.fail_get.write().await = fail;
    }

    /// Mark an order as completed out-of-band with the given captured
    /// amount string, as a redirect-approved payment would.
    pub async fn complete_order(&self, order_id: &str, captured_value: &str) {
        let mut orders = self.inner.orders.write().await;
        if let Some(order) = orders.get_mut(order_id) {
            order.status = "COMPLETED".to_string();
            order.captured_value = Some(captured_value.to_string());
        }
    }

    /// Make the next capture calls fail with the given provider body.
    pub async fn set_capture_failure(&self, payload: Value) {
        *self.inner.capture_behavior.write().await = CaptureBehavior::Fail(payload);
    }

    /// Make the next capture calls return a non-`COMPLETED` status.
    pub async fn set_capture_status(&self, status: &str) {
        *self.inner.capture_behavior.write().await = CaptureBehavior::Status(status.to_string());
    }

    /// Every `(listing_id, amount)` passed to `create_order`.
    pub async fn created_orders(&self) -> Vec<(String, Money)> {
        self.inner.created_orders.read().await.clone()
    }

    /// Every order id passed to `capture_order`.
    pub async fn capture_calls(&self) -> Vec<String> {
        self.inner.capture_calls.read().await.clone()
    }

    fn order_payload(order_id: &str, order: &MockOrder) -> Value {
        let mut unit = json!({
            "reference_id": order.listing_id,
            "amount": {
                "currency_code": CHECKOUT_CURRENCY,
                "value": order.amount.to_string(),
            },
        });
        if let Some(value) = &order.captured_value {
            unit["payments"] = json!({
                "captures": [{
                    "id": format!("CAP-{order_id}"),
                    "amount": {"currency_code": CHECKOUT_CURRENCY, "value": value},
                }]
            });
        }
        json!({
            "id": order_id,
            "status": order.status,
            "purchase_units": [unit],
        })
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(&self, listing_id: &str, amount: Money) -> PlazaResult<String> {
        if *self.inner.fail_create.read().await {
            return Err(PlazaError::gateway(
                "MockGateway: simulated order-creation failure",
            ));
        }

        let id = format!("ORD{}", self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        self.inner.orders.write().await.insert(
            id.clone(),
            MockOrder {
                listing_id: listing_id.to_string(),
                amount,
                status: "CREATED".to_string(),
                captured_value: None,
            },
        );
        self.inner
            .created_orders
            .write()
            .await
            .push((listing_id.to_string(), amount));
        Ok(id)
    }

    async fn get_order(&self, order_id: &str) -> PlazaResult<Value> {
        if *self.inner.fail_get.read().await {
            return Err(PlazaError::gateway(
                "MockGateway: simulated order-lookup failure",
            ));
        }

        let orders = self.inner.orders.read().await;
        let order = orders
            .get(order_id)
            .ok_or_else(|| PlazaError::gateway(format!("MockGateway: no such order {order_id}")))?;
        Ok(Self::order_payload(order_id, order))
    }

    async fn capture_order(&self, order_id: &str) -> PlazaResult<Value> {
        self.inner
            .capture_calls
            .write()
            .await
            .push(order_id.to_string());

        let behavior = self.inner.capture_behavior.read().await.clone();
        match behavior {
            CaptureBehavior::Fail(payload) => Err(PlazaError::Gateway {
                message: "capture failed: HTTP 422".to_string(),
                payload: Some(payload),
            }),
            CaptureBehavior::Status(status) => {
                let orders = self.inner.orders.read().await;
                let order = orders.get(order_id).ok_or_else(|| {
                    PlazaError::gateway(format!("MockGateway: no such order {order_id}"))
                })?;
                let mut payload = Self::order_payload(order_id, order);
                payload["status"] = Value::String(status);
                Ok(payload)
            }
            CaptureBehavior::Succeed => {
                let mut orders = self.inner.orders.write().await;
                let order = orders.get_mut(order_id).ok_or_else(|| {
                    PlazaError::gateway(format!("MockGateway: no such order {order_id}"))
                })?;
                order.status = "COMPLETED".to_string();
                order.captured_value = Some(order.amount.to_string());
                Ok(Self::order_payload(order_id, order))
            }
        }
    }
}
