//! Request handlers for the order endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::PlazaError;
use crate::lifecycle::{CheckoutAction, CheckoutFlow, LifecycleEngine, VerifyOutcome};
use crate::marketplace::Plan;
use crate::money::Money;
use crate::traits::{ListingStore, PaymentGateway, TimeProvider};

/// Engine handle shared by all handlers.
pub type Engine<S, G, C> = Arc<LifecycleEngine<S, G, C>>;

/// Error wrapper translating domain errors to HTTP responses.
///
/// Validation failures are the caller's fault (400); everything else is a
/// server error with the provider payload attached when one exists.
#[derive(Debug)]
pub struct ApiError(PlazaError);

impl From<PlazaError> for ApiError {
    fn from(err: PlazaError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            PlazaError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({"error": msg})),
            PlazaError::Unauthorized(msg) => (StatusCode::FORBIDDEN, json!({"error": msg})),
            PlazaError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({"error": msg})),
            PlazaError::InvalidState(msg) => (StatusCode::CONFLICT, json!({"error": msg})),
            PlazaError::Gateway {
                message,
                payload: Some(payload),
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": message, "details": payload}),
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": other.to_string()}),
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn bad_request(msg: &str) -> ApiError {
    ApiError(PlazaError::Validation(msg.to_string()))
}

/// Coerce a JSON amount into money: decimal strings exactly as the
/// gateway formats them, or bare numbers in whole currency units.
fn parse_amount(value: &Value) -> Option<Money> {
    match value {
        Value::String(s) => Money::parse_decimal(s).ok(),
        Value::Number(n) => {
            if let Some(units) = n.as_u64() {
                units.checked_mul(100).map(Money::from_cents)
            } else {
                let cents = (n.as_f64()? * 100.0).round();
                (cents >= 0.0 && cents <= u64::MAX as f64).then(|| Money::from_cents(cents as u64))
            }
        }
        _ => None,
    }
}

fn parse_action(action: Option<&str>) -> Result<CheckoutAction, ApiError> {
    match action {
        None | Some("create_listing") => Ok(CheckoutAction::CreateListing),
        Some("extend") => Ok(CheckoutAction::Extend),
        Some(other) => Err(bad_request(&format!("unknown action '{other}'"))),
    }
}

fn parse_plan(plan: Option<&str>) -> Result<Option<Plan>, ApiError> {
    match plan {
        None => Ok(None),
        Some(code) => Plan::from_code(code)
            .map(Some)
            .ok_or_else(|| bad_request(&format!("unknown plan '{code}'"))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    listing_id: Option<String>,
    amount: Option<Value>,
    action: Option<String>,
    plan: Option<String>,
    owner_id: Option<String>,
}

/// `POST /api/paypal/create-order`
pub async fn create_order<S, G, C>(
    State(engine): State<Engine<S, G, C>>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<Value>, ApiError>
where
    S: ListingStore + 'static,
    G: PaymentGateway + 'static,
    C: TimeProvider + 'static,
{
    let listing_id = body
        .listing_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request("listingId is required"))?;
    let amount = body
        .amount
        .as_ref()
        .and_then(parse_amount)
        .ok_or_else(|| bad_request("amount is required"))?;
    let action = parse_action(body.action.as_deref())?;
    let plan = parse_plan(body.plan.as_deref())?;

    let flow = engine
        .begin_checkout(&listing_id, amount, action, plan, body.owner_id.as_deref())
        .await?;

    Ok(Json(json!({"orderID": flow.order_id})))
}

#[derive(Debug, Deserialize)]
pub struct CaptureRequest {
    #[serde(rename = "orderID")]
    order_id: Option<String>,
    #[serde(rename = "listingId")]
    listing_id: Option<String>,
    action: Option<String>,
    plan: Option<String>,
    amount: Option<Value>,
}

/// `POST /api/paypal/capture`
pub async fn capture<S, G, C>(
    State(engine): State<Engine<S, G, C>>,
    Json(body): Json<CaptureRequest>,
) -> Result<Json<Value>, ApiError>
where
    S: ListingStore + 'static,
    G: PaymentGateway + 'static,
    C: TimeProvider + 'static,
{
    let order_id = body
        .order_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request("orderID is required"))?;
    let listing_id = body
        .listing_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request("listingId is required"))?;
    let action = parse_action(body.action.as_deref())?;
    let plan = parse_plan(body.plan.as_deref())?;

    let flow = CheckoutFlow {
        listing_id,
        order_id,
        action,
        amount: body.amount.as_ref().and_then(parse_amount).unwrap_or(Money::ZERO),
    };

    let outcome = engine.capture(&flow, plan).await?;
    Ok(Json(json!({"ok": true, "status": outcome.status_label()})))
}

/// `GET /api/paypal/verify-order/{order_id}/{listing_id}`
pub async fn verify_order<S, G, C>(
    State(engine): State<Engine<S, G, C>>,
    Path((order_id, listing_id)): Path<(String, String)>,
) -> Result<Response, ApiError>
where
    S: ListingStore + 'static,
    G: PaymentGateway + 'static,
    C: TimeProvider + 'static,
{
    match engine.verify_order(&order_id, &listing_id).await? {
        VerifyOutcome::Completed => Ok(Json(json!({"ok": true})).into_response()),
        VerifyOutcome::Incomplete { status } => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "order not completed", "status": status})),
        )
            .into_response()),
    }
}

/// `GET /healthz`
pub async fn healthz() -> &'static str {
    "ok"
}
