//! The listing payment/lifecycle state machine.
//!
//! Governs `pending_payment` → `verified` → `expired` transitions, driven
//! by checkout actions and the gateway's capture confirmations.
//! Abstracted over the store, gateway, and clock dependencies so the whole
//! machine is testable without a live provider.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{PlanPricing, SWEEP_DELAY_SECS};
use crate::error::{PlazaError, PlazaResult};
use crate::gateway::amount::{captured_amount, order_status};
use crate::gateway::outcome::{is_already_captured, CaptureOutcome, STATUS_COMPLETED};
use crate::lifecycle::checkout::{CheckoutAction, CheckoutFlow};
use crate::lifecycle::sweeper::SweepScheduler;
use crate::marketplace::{
    extended_expiry, validate_draft, Listing, ListingDraft, ListingPatch, ListingStatus, Plan,
};
use crate::money::Money;
use crate::traits::{ListingStore, PaymentGateway, TimeProvider};

/// Result of the idempotent out-of-band verification poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Gateway reported the order completed; the listing was verified.
    Completed,
    /// Order not completed; the listing was left untouched.
    Incomplete { status: String },
}

/// The lifecycle state machine over its injected dependencies.
pub struct LifecycleEngine<S, G, C>
where
    S: ListingStore,
    G: PaymentGateway,
    C: TimeProvider,
{
    store: S,
    gateway: G,
    time: C,
    pricing: PlanPricing,
    sweeper: SweepScheduler,
    sweep_delay: Duration,
    /// Listings with a capture currently in flight.
    captures_in_flight: Arc<Mutex<HashSet<String>>>,
}

impl<S, G, C> LifecycleEngine<S, G, C>
where
    S: ListingStore + 'static,
    G: PaymentGateway,
    C: TimeProvider,
{
    pub fn new(store: S, gateway: G, time: C, pricing: PlanPricing) -> Self {
        Self {
            store,
            gateway,
            time,
            pricing,
            sweeper: SweepScheduler::new(),
            sweep_delay: Duration::from_secs(SWEEP_DELAY_SECS),
            captures_in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Override the sweep delay (tests, staging).
    #[must_use]
    pub fn with_sweep_delay(mut self, delay: Duration) -> Self {
        self.sweep_delay = delay;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sweeper(&self) -> &SweepScheduler {
        &self.sweeper
    }

    /// Validate a draft and write it as a pending listing.
    ///
    /// The price is computed server-side from the draft's plan; the
    /// initial expiry is one plan duration from now.
    pub async fn create_listing(&self, draft: ListingDraft) -> PlazaResult<Listing> {
        validate_draft(&draft)?;

        let now = self.time.now_ms();
        let price = self.pricing.price(draft.plan);
        let listing = Listing::from_draft(draft, Uuid::new_v4().to_string(), price, now);

        self.store.put(&listing).await?;
        info!(
            "Created listing {} ({}) pending payment of {}",
            listing.id, listing.details.name, listing.price
        );
        Ok(listing)
    }

    /// Create a gateway order for a listing and hand back the flow state.
    ///
    /// The client-asserted amount is checked against the plan's price
    /// before any gateway call. On gateway failure the listing is
    /// compensating-expired and the error propagates. A create-flow order
    /// arms the reconciliation sweep.
    pub async fn begin_checkout(
        &self,
        listing_id: &str,
        amount: Money,
        action: CheckoutAction,
        requested_plan: Option<Plan>,
        requester: Option<&str>,
    ) -> PlazaResult<CheckoutFlow> {
        let listing = self
            .store
            .get(listing_id)
            .await?
            .ok_or_else(|| PlazaError::NotFound(format!("listing {listing_id}")))?;

        if let Some(requester) = requester {
            if requester != listing.owner_id {
                return Err(PlazaError::Unauthorized(format!(
                    "requester does not own listing {listing_id}"
                )));
            }
        }

        let plan = requested_plan.unwrap_or(listing.plan);
        let expected = self.pricing.price(plan);
        if amount != expected {
            return Err(PlazaError::Validation(format!(
                "amount {amount} does not match plan {plan} price {expected}"
            )));
        }

        match self.gateway.create_order(listing_id, amount).await {
            Ok(order_id) => {
                if action == CheckoutAction::CreateListing {
                    self.schedule_sweep(listing_id);
                }
                Ok(CheckoutFlow {
                    listing_id: listing_id.to_string(),
                    order_id,
                    action,
                    amount,
                })
            }
            Err(err) => {
                warn!("Order creation failed for listing {listing_id}: {err}");
                self.compensate_expire(listing_id).await;
                Err(err)
            }
        }
    }

    /// Resolve a checkout by confirming the capture with the gateway.
    ///
    /// Checks the order's current status first so redirect flows the
    /// gateway already completed are honored without a duplicate capture
    /// call, and maps the provider's "order already captured" refusal to
    /// success. Every other failure compensating-expires the listing.
    pub async fn capture(
        &self,
        flow: &CheckoutFlow,
        requested_plan: Option<Plan>,
    ) -> PlazaResult<CaptureOutcome> {
        let _guard = self.begin_capture(&flow.listing_id)?;

        match self.capture_inner(flow, requested_plan).await {
            Ok(outcome) => {
                info!(
                    "Capture for listing {} resolved as {}",
                    flow.listing_id,
                    outcome.status_label()
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!("Capture failed for listing {}: {err}", flow.listing_id);
                self.compensate_expire(&flow.listing_id).await;
                Err(err)
            }
        }
    }

    async fn capture_inner(
        &self,
        flow: &CheckoutFlow,
        requested_plan: Option<Plan>,
    ) -> PlazaResult<CaptureOutcome> {
        let order = self.gateway.get_order(&flow.order_id).await?;

        // Redirect-based approval can complete the order out-of-band
        // before the client ever reaches us.
        if order_status(&order) == Some(STATUS_COMPLETED) {
            let outcome = CaptureOutcome::AlreadyCompleted {
                amount: captured_amount(&order),
            };
            self.apply_capture_success(flow, &outcome, requested_plan)
                .await?;
            return Ok(outcome);
        }

        match self.gateway.capture_order(&flow.order_id).await {
            Ok(payload) => {
                let status = order_status(&payload).unwrap_or("UNKNOWN");
                if status != STATUS_COMPLETED {
                    return Err(PlazaError::Gateway {
                        message: format!("capture returned status {status}"),
                        payload: Some(payload),
                    });
                }
                let outcome = CaptureOutcome::Completed {
                    amount: captured_amount(&payload),
                };
                self.apply_capture_success(flow, &outcome, requested_plan)
                    .await?;
                Ok(outcome)
            }
            Err(err) => {
                // A client retry racing a prior successful capture: the
                // money is in, so this is success, not an error.
                if err.gateway_payload().is_some_and(is_already_captured) {
                    let outcome = CaptureOutcome::AlreadyCaptured;
                    self.apply_capture_success(flow, &outcome, requested_plan)
                        .await?;
                    return Ok(outcome);
                }
                Err(err)
            }
        }
    }

    /// Persist the listing mutation a successful capture implies.
    async fn apply_capture_success(
        &self,
        flow: &CheckoutFlow,
        outcome: &CaptureOutcome,
        requested_plan: Option<Plan>,
    ) -> PlazaResult<()> {
        let patch = match flow.action {
            CheckoutAction::CreateListing => {
                let mut patch = ListingPatch::status(ListingStatus::Verified);
                match outcome {
                    // A prior capture already recorded pricePaid; it must
                    // not be overwritten.
                    CaptureOutcome::AlreadyCaptured => {}
                    CaptureOutcome::Completed { amount }
                    | CaptureOutcome::AlreadyCompleted { amount } => {
                        patch = patch.with_price_paid(amount.unwrap_or(Money::ZERO));
                    }
                }
                patch
            }
            CheckoutAction::Extend => {
                let listing = self
                    .store
                    .get(&flow.listing_id)
                    .await?
                    .ok_or_else(|| PlazaError::NotFound(format!("listing {}", flow.listing_id)))?;

                let plan = requested_plan.unwrap_or(listing.plan);
                let new_expiry =
                    extended_expiry(listing.expires_at, self.time.now_ms(), plan);

                let mut patch = ListingPatch::default()
                    .with_expires_at(new_expiry)
                    .with_plan(plan);
                // An extension must not leave the listing pending, but
                // otherwise does not touch status or pricePaid.
                if listing.status == ListingStatus::PendingPayment {
                    patch.status = Some(ListingStatus::Verified);
                }
                patch
            }
        };

        self.store.update(&flow.listing_id, patch).await?;
        self.sweeper.cancel(&flow.listing_id);
        Ok(())
    }

    /// Idempotent out-of-band poll: re-query the order and force the
    /// listing to verified if the gateway reports it completed.
    pub async fn verify_order(
        &self,
        order_id: &str,
        listing_id: &str,
    ) -> PlazaResult<VerifyOutcome> {
        let order = self.gateway.get_order(order_id).await?;
        let status = order_status(&order).unwrap_or("UNKNOWN");

        if status != STATUS_COMPLETED {
            return Ok(VerifyOutcome::Incomplete {
                status: status.to_string(),
            });
        }

        self.store
            .update(listing_id, ListingPatch::status(ListingStatus::Verified))
            .await?;
        self.sweeper.cancel(listing_id);
        info!("Verified listing {listing_id} from order {order_id}");
        Ok(VerifyOutcome::Completed)
    }

    /// Delete a listing on behalf of `requester`; owners only.
    pub async fn delete_listing(&self, listing_id: &str, requester: &str) -> PlazaResult<()> {
        let listing = self
            .store
            .get(listing_id)
            .await?
            .ok_or_else(|| PlazaError::NotFound(format!("listing {listing_id}")))?;

        if listing.owner_id != requester {
            return Err(PlazaError::Unauthorized(format!(
                "requester does not own listing {listing_id}"
            )));
        }

        self.sweeper.cancel(listing_id);
        self.store.delete(listing_id).await
    }

    /// Run the reconciliation check for a listing immediately.
    ///
    /// Returns `true` if the listing was still pending and got expired
    /// and removed.
    pub async fn sweep(&self, listing_id: &str) -> PlazaResult<bool> {
        sweep_pending(&self.store, listing_id).await
    }

    /// Cancel every armed sweep (shutdown).
    pub fn shutdown(&self) {
        self.sweeper.cancel_all();
    }

    fn schedule_sweep(&self, listing_id: &str) {
        let store = self.store.clone();
        let id = listing_id.to_string();
        self.sweeper.schedule(listing_id, self.sweep_delay, async move {
            match sweep_pending(&store, &id).await {
                Ok(true) => info!("Swept listing {id}: payment never completed"),
                Ok(false) => {}
                Err(e) => warn!("Sweep for listing {id} failed: {e}"),
            }
        });
    }

    /// Best-effort compensating transition to `expired` after a gateway
    /// failure. A store failure here is logged, not retried; the original
    /// error is what the caller reports.
    async fn compensate_expire(&self, listing_id: &str) {
        self.sweeper.cancel(listing_id);
        if let Err(e) = self
            .store
            .update(listing_id, ListingPatch::status(ListingStatus::Expired))
            .await
        {
            warn!("Failed to expire listing {listing_id} after gateway failure: {e}");
        }
    }

    fn begin_capture(&self, listing_id: &str) -> PlazaResult<CaptureGuard> {
        let mut in_flight = self.captures_in_flight.lock();
        if !in_flight.insert(listing_id.to_string()) {
            return Err(PlazaError::InvalidState(format!(
                "a capture is already in flight for listing {listing_id}"
            )));
        }
        Ok(CaptureGuard {
            set: self.captures_in_flight.clone(),
            listing_id: listing_id.to_string(),
        })
    }
}

/// Releases the per-listing capture slot when the capture resolves.
struct CaptureGuard {
    set: Arc<Mutex<HashSet<String>>>,
    listing_id: String,
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.set.lock().remove(&self.listing_id);
    }
}

/// The sweep body: re-read the listing and, only if it is still awaiting
/// payment, mark it expired and remove it.
pub(crate) async fn sweep_pending<S: ListingStore>(
    store: &S,
    listing_id: &str,
) -> PlazaResult<bool> {
    match store.get(listing_id).await? {
        Some(listing) if listing.status == ListingStatus::PendingPayment => {
            if let Err(e) = store
                .update(listing_id, ListingPatch::status(ListingStatus::Expired))
                .await
            {
                warn!("Failed to expire listing {listing_id} during sweep: {e}");
            }
            store.delete(listing_id).await?;
            Ok(true)
        }
        _ => Ok(false),
    }
}
