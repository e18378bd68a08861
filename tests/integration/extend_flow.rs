//! Extension-flow integration tests: expiry arithmetic and plan
//! fallbacks.

use plaza::{CheckoutAction, ListingPatch, ListingStatus, ListingStore, Money, Plan, PlazaError};

use crate::common::{harness::START_MS, CheckoutHarness};

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Set a listing verified with a specific expiry, as a previously paid
/// listing would be.
async fn make_verified(harness: &CheckoutHarness, name: &str, expires_at: u64) -> String {
    let listing = harness.create_listing(name, Plan::OneMonth).await;
    harness
        .store
        .update(
            &listing.id,
            ListingPatch::status(ListingStatus::Verified).with_expires_at(expires_at),
        )
        .await
        .unwrap();
    listing.id
}

#[tokio::test]
async fn test_extend_scenario_future_expiry_stacks() {
    // L3: plan "3", current expiry now + 5 days, capture succeeds ->
    // new expiry = now + 5 days + 90 days.
    let harness = CheckoutHarness::new();
    let id = make_verified(&harness, "L3", START_MS + 5 * DAY_MS).await;

    let listing = harness.stored(&id).await.unwrap();
    let flow = harness
        .begin(&listing, CheckoutAction::Extend, Some(Plan::ThreeMonths))
        .await;
    harness
        .engine
        .capture(&flow, Some(Plan::ThreeMonths))
        .await
        .unwrap();

    let stored = harness.stored(&id).await.unwrap();
    assert_eq!(
        stored.expires_at,
        Some(START_MS + 5 * DAY_MS + 90 * DAY_MS)
    );
    assert_eq!(stored.plan, Plan::ThreeMonths);
}

#[tokio::test]
async fn test_extend_past_expiry_restarts_from_now() {
    let harness = CheckoutHarness::new();
    let id = make_verified(&harness, "Lapsed", START_MS - 10 * DAY_MS).await;

    let listing = harness.stored(&id).await.unwrap();
    let flow = harness
        .begin(&listing, CheckoutAction::Extend, Some(Plan::OneMonth))
        .await;
    harness.engine.capture(&flow, Some(Plan::OneMonth)).await.unwrap();

    let stored = harness.stored(&id).await.unwrap();
    assert_eq!(stored.expires_at, Some(START_MS + 30 * DAY_MS));
}

#[tokio::test]
async fn test_extend_defaults_to_listing_plan() {
    let harness = CheckoutHarness::new();
    let listing = harness.create_listing("Fallback", Plan::SixMonths).await;

    // No plan given anywhere in the flow: the listing's six-month plan
    // prices the order and determines the extension.
    let flow = harness
        .begin(&listing, CheckoutAction::Extend, None)
        .await;
    assert_eq!(flow.amount, CheckoutHarness::price(Plan::SixMonths));

    harness.engine.capture(&flow, None).await.unwrap();

    let stored = harness.stored(&listing.id).await.unwrap();
    let original_expiry = START_MS + Plan::SixMonths.duration_ms();
    assert_eq!(
        stored.expires_at,
        Some(original_expiry + Plan::SixMonths.duration_ms())
    );
}

#[tokio::test]
async fn test_extend_resolves_pending_listing_to_verified() {
    let harness = CheckoutHarness::new();
    let listing = harness.create_listing("Pending Extend", Plan::OneMonth).await;
    assert_eq!(listing.status, ListingStatus::PendingPayment);

    let flow = harness
        .begin(&listing, CheckoutAction::Extend, None)
        .await;
    harness.engine.capture(&flow, None).await.unwrap();

    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.status, ListingStatus::Verified);
}

#[tokio::test]
async fn test_extend_does_not_touch_price_paid() {
    let harness = CheckoutHarness::new();

    // Pay for the listing first.
    let (listing, flow) = harness.checkout("Paid Then Extended", Plan::OneMonth).await;
    harness.engine.capture(&flow, None).await.unwrap();
    assert_eq!(
        harness.stored(&listing.id).await.unwrap().price_paid,
        Money::from_cents(1000)
    );

    // Extend with a pricier plan; the recorded first payment stands.
    let stored = harness.stored(&listing.id).await.unwrap();
    let flow = harness
        .begin(&stored, CheckoutAction::Extend, Some(Plan::TwelveMonths))
        .await;
    harness
        .engine
        .capture(&flow, Some(Plan::TwelveMonths))
        .await
        .unwrap();

    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.price_paid, Money::from_cents(1000));
    assert_eq!(stored.plan, Plan::TwelveMonths);
}

#[tokio::test]
async fn test_extend_amount_checked_against_requested_plan() {
    let harness = CheckoutHarness::new();
    let listing = harness.create_listing("Mismatch", Plan::OneMonth).await;

    // One-month money for a twelve-month extension: rejected before any
    // gateway call.
    let err = harness
        .engine
        .begin_checkout(
            &listing.id,
            CheckoutHarness::price(Plan::OneMonth),
            CheckoutAction::Extend,
            Some(Plan::TwelveMonths),
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PlazaError::Validation(_)));
    assert!(harness.gateway.created_orders().await.is_empty());
}
