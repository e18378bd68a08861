//! Error and failure-path integration tests.

use plaza::mocks::MockStoreFailure;
use plaza::{CheckoutAction, ListingStatus, Plan, PlazaError};

use crate::common::CheckoutHarness;

#[tokio::test]
async fn test_compensating_expire_failure_is_swallowed() {
    // Gateway fails, then the cleanup write fails too: the caller still
    // sees the original gateway error and the listing stays as it was.
    let harness = CheckoutHarness::new();
    let listing = harness.create_listing("Unlucky", Plan::OneMonth).await;

    harness.gateway.fail_create_order(true).await;
    harness
        .store
        .set_fail_mode(Some(MockStoreFailure::Writes))
        .await;

    let err = harness
        .engine
        .begin_checkout(
            &listing.id,
            CheckoutHarness::price(Plan::OneMonth),
            CheckoutAction::CreateListing,
            None,
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PlazaError::Gateway { .. }));
    assert!(err.to_string().contains("order-creation"));

    harness.store.set_fail_mode(None).await;
    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.status, ListingStatus::PendingPayment);
}

#[tokio::test]
async fn test_capture_store_failure_reports_store_error() {
    let harness = CheckoutHarness::new();
    let (listing, flow) = harness.checkout("Store Down", Plan::OneMonth).await;

    harness
        .store
        .set_fail_mode(Some(MockStoreFailure::Writes))
        .await;

    let err = harness.engine.capture(&flow, None).await.unwrap_err();
    assert!(matches!(err, PlazaError::Store(_)));

    // Best-effort compensation could not run either; the listing is
    // still pending once the store recovers.
    harness.store.set_fail_mode(None).await;
    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.status, ListingStatus::PendingPayment);
}

#[tokio::test]
async fn test_verify_gateway_failure_mutates_nothing() {
    let harness = CheckoutHarness::new();
    let (listing, flow) = harness.checkout("Verify Outage", Plan::OneMonth).await;

    harness.gateway.fail_get_order(true).await;

    let result = harness.engine.verify_order(&flow.order_id, &listing.id).await;
    assert!(result.is_err());

    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.status, ListingStatus::PendingPayment);
}

#[tokio::test]
async fn test_checkout_against_unknown_listing() {
    let harness = CheckoutHarness::new();

    let err = harness
        .engine
        .begin_checkout(
            "never-created",
            CheckoutHarness::price(Plan::OneMonth),
            CheckoutAction::CreateListing,
            None,
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PlazaError::NotFound(_)));
    assert!(harness.gateway.created_orders().await.is_empty());
}

#[tokio::test]
async fn test_capture_for_unknown_order_expires_listing() {
    let harness = CheckoutHarness::new();
    let listing = harness.create_listing("Bogus Order", Plan::OneMonth).await;

    let flow = plaza::CheckoutFlow {
        listing_id: listing.id.clone(),
        order_id: "ORD-FORGED".to_string(),
        action: CheckoutAction::CreateListing,
        amount: CheckoutHarness::price(Plan::OneMonth),
    };

    let err = harness.engine.capture(&flow, None).await.unwrap_err();
    assert!(matches!(err, PlazaError::Gateway { .. }));

    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.status, ListingStatus::Expired);
}

#[tokio::test]
async fn test_delete_requires_owner() {
    let harness = CheckoutHarness::new();
    let listing = harness.create_listing("Owned", Plan::OneMonth).await;

    let err = harness
        .engine
        .delete_listing(&listing.id, "intruder")
        .await
        .unwrap_err();
    assert!(matches!(err, PlazaError::Unauthorized(_)));

    harness
        .engine
        .delete_listing(&listing.id, "owner-1")
        .await
        .unwrap();
    assert!(harness.stored(&listing.id).await.is_none());
}
