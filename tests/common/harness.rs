//! Checkout test harness.
//!
//! Wires the lifecycle engine to mock implementations of the store,
//! gateway, and clock, allowing fast, deterministic testing of complete
//! checkout flows.

use std::sync::Arc;
use std::time::Duration;

use plaza::mocks::{MockGateway, MockStore, MockTime};
use plaza::{
    CheckoutAction, CheckoutFlow, Listing, ListingDetails, ListingDraft, ListingStore,
    LifecycleEngine, Money, Plan, PlanPricing,
};

/// Harness start time: 2024-01-01 00:00:00 UTC, in milliseconds.
pub const START_MS: u64 = 1_704_067_200_000;

pub struct CheckoutHarness {
    pub engine: Arc<LifecycleEngine<MockStore, MockGateway, MockTime>>,
    pub store: MockStore,
    pub gateway: MockGateway,
    pub time: MockTime,
}

#[allow(dead_code)]
impl CheckoutHarness {
    pub fn new() -> Self {
        Self::with_sweep_delay(Duration::from_secs(60))
    }

    pub fn with_sweep_delay(delay: Duration) -> Self {
        let store = MockStore::new();
        let gateway = MockGateway::new();
        let time = MockTime::new(START_MS);

        let engine = Arc::new(
            LifecycleEngine::new(
                store.clone(),
                gateway.clone(),
                time.clone(),
                PlanPricing::default(),
            )
            .with_sweep_delay(delay),
        );

        Self {
            engine,
            store,
            gateway,
            time,
        }
    }

    /// The configured price for a plan.
    pub fn price(plan: Plan) -> Money {
        PlanPricing::default().price(plan)
    }

    pub fn make_draft(name: &str, plan: Plan) -> ListingDraft {
        ListingDraft {
            owner_id: "owner-1".to_string(),
            plan,
            details: ListingDetails {
                name: name.to_string(),
                description: "Round-the-clock local service".to_string(),
                category: "home-services".to_string(),
                location: "Springfield".to_string(),
                contact: "+1 555 123 4567".to_string(),
                ..ListingDetails::default()
            },
        }
    }

    /// Create a pending listing.
    pub async fn create_listing(&self, name: &str, plan: Plan) -> Listing {
        self.engine
            .create_listing(Self::make_draft(name, plan))
            .await
            .expect("failed to create listing")
    }

    /// Begin a checkout for a listing at the plan's correct price.
    pub async fn begin(
        &self,
        listing: &Listing,
        action: CheckoutAction,
        plan: Option<Plan>,
    ) -> CheckoutFlow {
        let amount = Self::price(plan.unwrap_or(listing.plan));
        self.engine
            .begin_checkout(&listing.id, amount, action, plan, None)
            .await
            .expect("failed to begin checkout")
    }

    /// Create a listing and open its create-flow checkout.
    pub async fn checkout(&self, name: &str, plan: Plan) -> (Listing, CheckoutFlow) {
        let listing = self.create_listing(name, plan).await;
        let flow = self
            .begin(&listing, CheckoutAction::CreateListing, None)
            .await;
        (listing, flow)
    }

    /// Advance the logical clock by the specified milliseconds.
    pub fn advance_time(&self, ms: u64) {
        self.time.advance(ms);
    }

    /// Current stored state of a listing.
    pub async fn stored(&self, id: &str) -> Option<Listing> {
        self.store.get(id).await.expect("store read failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaza::ListingStatus;

    #[tokio::test]
    async fn test_harness_creates_pending_listing() {
        let harness = CheckoutHarness::new();
        let listing = harness.create_listing("Test Service", Plan::OneMonth).await;

        assert_eq!(listing.status, ListingStatus::PendingPayment);
        assert_eq!(listing.price, CheckoutHarness::price(Plan::OneMonth));
    }

    #[tokio::test]
    async fn test_harness_checkout_returns_flow() {
        let harness = CheckoutHarness::new();
        let (listing, flow) = harness.checkout("Test Service", Plan::OneMonth).await;

        assert_eq!(flow.listing_id, listing.id);
        assert!(!flow.order_id.is_empty());
    }
}
