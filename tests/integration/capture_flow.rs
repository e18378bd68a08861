//! Capture-path integration tests: happy path, idempotent retries, and
//! failure compensation.

use serde_json::json;

use plaza::{ListingStatus, Money, Plan, VerifyOutcome};

use crate::common::CheckoutHarness;

#[tokio::test]
async fn test_capture_records_gateway_amount_not_client_amount() {
    let harness = CheckoutHarness::new();
    let (listing, flow) = harness.checkout("Service", Plan::ThreeMonths).await;

    // The gateway completed the order over a different amount than the
    // client asserted; the gateway's number wins.
    harness.gateway.complete_order(&flow.order_id, "25.00").await;

    harness.engine.capture(&flow, None).await.unwrap();

    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.price_paid, Money::from_cents(2500));
}

#[tokio::test]
async fn test_already_completed_order_skips_capture_call() {
    let harness = CheckoutHarness::new();
    let (listing, flow) = harness.checkout("Redirect Flow", Plan::OneMonth).await;

    // Redirect-based approval completed the order out-of-band.
    harness.gateway.complete_order(&flow.order_id, "10.00").await;

    let outcome = harness.engine.capture(&flow, None).await.unwrap();

    assert_eq!(outcome.status_label(), "ALREADY_COMPLETED");
    assert!(harness.gateway.capture_calls().await.is_empty());
    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.status, ListingStatus::Verified);
    assert_eq!(stored.price_paid, Money::from_cents(1000));
}

#[tokio::test]
async fn test_double_capture_is_idempotent() {
    let harness = CheckoutHarness::new();
    let (listing, flow) = harness.checkout("Double Submit", Plan::OneMonth).await;

    let first = harness.engine.capture(&flow, None).await.unwrap();
    assert_eq!(first.status_label(), "COMPLETED");

    // The retry finds the order completed and does not touch the amount
    // a second time.
    let second = harness.engine.capture(&flow, None).await.unwrap();
    assert_eq!(second.status_label(), "ALREADY_COMPLETED");

    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.status, ListingStatus::Verified);
    assert_eq!(stored.price_paid, Money::from_cents(1000));
}

#[tokio::test]
async fn test_already_captured_refusal_is_success() {
    let harness = CheckoutHarness::new();
    let (listing, flow) = harness.checkout("Race", Plan::OneMonth).await;

    harness
        .gateway
        .set_capture_failure(json!({
            "name": "UNPROCESSABLE_ENTITY",
            "details": [{"issue": "ORDER_ALREADY_CAPTURED", "description": "Order already captured."}]
        }))
        .await;

    let outcome = harness.engine.capture(&flow, None).await.unwrap();
    assert_eq!(outcome.status_label(), "ALREADY_CAPTURED");

    // Repeated calls stay successful and leave state unchanged.
    let again = harness.engine.capture(&flow, None).await.unwrap();
    assert_eq!(again.status_label(), "ALREADY_CAPTURED");

    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.status, ListingStatus::Verified);
    // Never recorded an amount: the winning capture's record stands.
    assert_eq!(stored.price_paid, Money::ZERO);
}

#[tokio::test]
async fn test_declined_capture_expires_listing_with_payload() {
    let harness = CheckoutHarness::new();
    let (listing, flow) = harness.checkout("Declined", Plan::OneMonth).await;

    harness
        .gateway
        .set_capture_failure(json!({
            "name": "UNPROCESSABLE_ENTITY",
            "details": [{"issue": "INSTRUMENT_DECLINED"}]
        }))
        .await;

    let err = harness.engine.capture(&flow, None).await.unwrap_err();

    let payload = err.gateway_payload().expect("provider payload attached");
    assert_eq!(payload["details"][0]["issue"], "INSTRUMENT_DECLINED");

    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.status, ListingStatus::Expired);
}

#[tokio::test]
async fn test_verify_order_poll_is_idempotent() {
    let harness = CheckoutHarness::new();
    let (listing, flow) = harness.checkout("Verify Poll", Plan::OneMonth).await;

    // Order not completed yet: reported, not mutated.
    let pending = harness
        .engine
        .verify_order(&flow.order_id, &listing.id)
        .await
        .unwrap();
    assert_eq!(
        pending,
        VerifyOutcome::Incomplete {
            status: "CREATED".to_string()
        }
    );
    assert_eq!(
        harness.stored(&listing.id).await.unwrap().status,
        ListingStatus::PendingPayment
    );

    // Once completed, verify flips the listing; verifying again is a
    // no-op success.
    harness.gateway.complete_order(&flow.order_id, "10.00").await;
    for _ in 0..2 {
        let outcome = harness
            .engine
            .verify_order(&flow.order_id, &listing.id)
            .await
            .unwrap();
        assert_eq!(outcome, VerifyOutcome::Completed);
    }
    assert_eq!(
        harness.stored(&listing.id).await.unwrap().status,
        ListingStatus::Verified
    );
}

#[tokio::test]
async fn test_status_never_leaves_the_three_states() {
    let harness = CheckoutHarness::new();

    // Walk a listing through every transition and check the status at
    // each observation point.
    let (listing, flow) = harness.checkout("Invariant", Plan::OneMonth).await;
    let valid = |status: ListingStatus| {
        matches!(
            status,
            ListingStatus::PendingPayment | ListingStatus::Verified | ListingStatus::Expired
        )
    };

    assert!(valid(harness.stored(&listing.id).await.unwrap().status));
    harness.engine.capture(&flow, None).await.unwrap();
    assert!(valid(harness.stored(&listing.id).await.unwrap().status));

    let (listing2, flow2) = harness.checkout("Invariant 2", Plan::OneMonth).await;
    harness
        .gateway
        .set_capture_failure(json!({"details": [{"issue": "INSTRUMENT_DECLINED"}]}))
        .await;
    let _ = harness.engine.capture(&flow2, None).await;
    assert!(valid(harness.stored(&listing2.id).await.unwrap().status));
}
