//! PayPal orders-API client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::{CHECKOUT_CURRENCY, HTTP_TIMEOUT_SECS};
use crate::error::{PlazaError, PlazaResult};
use crate::money::Money;
use crate::traits::PaymentGateway;

const SANDBOX_BASE_URL: &str = "https://api-m.sandbox.paypal.com";
const LIVE_BASE_URL: &str = "https://api-m.paypal.com";

/// Client for the provider's OAuth token and order lifecycle endpoints.
///
/// A short-lived bearer token is exchanged per call sequence; the client
/// never proceeds with an empty token.
#[derive(Debug, Clone)]
pub struct PayPalClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    base_url: String,
}

impl PayPalClient {
    pub fn new(client_id: String, client_secret: String, sandbox: bool) -> PlazaResult<Self> {
        let base_url = if sandbox { SANDBOX_BASE_URL } else { LIVE_BASE_URL };
        Self::with_base_url(client_id, client_secret, base_url.to_string())
    }

    /// Construct against an explicit base URL (stub servers in tests).
    pub fn with_base_url(
        client_id: String,
        client_secret: String,
        base_url: String,
    ) -> PlazaResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| PlazaError::gateway(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            client_id,
            client_secret,
            base_url,
        })
    }

    /// Exchange the configured credentials for a bearer token.
    async fn access_token(&self) -> PlazaResult<String> {
        let resp = self
            .http
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PlazaError::gateway(format!("token exchange request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PlazaError::gateway(format!(
                "token exchange failed: HTTP {status}"
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| PlazaError::gateway(format!("token exchange returned bad JSON: {e}")))?;

        body.get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| PlazaError::gateway("token exchange returned no access token"))
    }

    /// Read a response into (status, payload), tolerating non-JSON bodies.
    async fn read_payload(resp: reqwest::Response) -> (reqwest::StatusCode, Option<Value>) {
        let status = resp.status();
        let payload = match resp.text().await {
            Ok(text) if !text.is_empty() => serde_json::from_str(&text).ok(),
            _ => None,
        };
        (status, payload)
    }
}

/// Order-creation request body: a single immediate-capture purchase unit
/// referencing the listing, shipping disabled, immediate payment forced.
pub fn order_request_body(listing_id: &str, amount: Money) -> Value {
    json!({
        "intent": "CAPTURE",
        "purchase_units": [{
            "reference_id": listing_id,
            "amount": {
                "currency_code": CHECKOUT_CURRENCY,
                "value": amount.to_string(),
            },
        }],
        "application_context": {
            "shipping_preference": "NO_SHIPPING",
            "user_action": "PAY_NOW",
        },
    })
}

#[async_trait]
impl PaymentGateway for PayPalClient {
    async fn create_order(&self, listing_id: &str, amount: Money) -> PlazaResult<String> {
        let token = self.access_token().await?;

        let resp = self
            .http
            .post(format!("{}/v2/checkout/orders", self.base_url))
            .bearer_auth(token)
            .json(&order_request_body(listing_id, amount))
            .send()
            .await
            .map_err(|e| PlazaError::gateway(format!("order creation request failed: {e}")))?;

        let (status, payload) = Self::read_payload(resp).await;
        if !status.is_success() {
            return Err(PlazaError::Gateway {
                message: format!("order creation failed: HTTP {status}"),
                payload,
            });
        }

        let order_id = payload
            .as_ref()
            .and_then(|p| p.get("id"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        match order_id {
            Some(id) => {
                info!("Created order {} for listing {}", id, listing_id);
                Ok(id)
            }
            None => Err(PlazaError::Gateway {
                message: "order creation returned no order id".to_string(),
                payload,
            }),
        }
    }

    async fn get_order(&self, order_id: &str) -> PlazaResult<Value> {
        let token = self.access_token().await?;

        let resp = self
            .http
            .get(format!("{}/v2/checkout/orders/{order_id}", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PlazaError::gateway(format!("order lookup request failed: {e}")))?;

        let (status, payload) = Self::read_payload(resp).await;
        if !status.is_success() {
            return Err(PlazaError::Gateway {
                message: format!("order lookup failed: HTTP {status}"),
                payload,
            });
        }

        debug!("Fetched order {} status", order_id);
        payload.ok_or_else(|| PlazaError::gateway("order lookup returned an empty body"))
    }

    async fn capture_order(&self, order_id: &str) -> PlazaResult<Value> {
        let token = self.access_token().await?;

        let resp = self
            .http
            .post(format!(
                "{}/v2/checkout/orders/{order_id}/capture",
                self.base_url
            ))
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| PlazaError::gateway(format!("capture request failed: {e}")))?;

        let (status, payload) = Self::read_payload(resp).await;
        if !status.is_success() {
            return Err(PlazaError::Gateway {
                message: format!("capture failed: HTTP {status}"),
                payload,
            });
        }

        info!("Captured order {}", order_id);
        payload.ok_or_else(|| PlazaError::gateway("capture returned an empty body"))
    }
}
