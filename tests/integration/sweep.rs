//! Reconciliation sweeper integration tests.
//!
//! These run on a paused runtime so the 60-second sweep delay elapses
//! instantly and deterministically.

use std::time::Duration;

use plaza::{ListingStatus, ListingStore, Plan};

use crate::common::CheckoutHarness;

#[tokio::test(start_paused = true)]
async fn test_pending_listing_swept_after_delay() {
    let harness = CheckoutHarness::new();
    let (listing, _flow) = harness.checkout("Never Paid", Plan::OneMonth).await;

    // Just before the sweep: still pending, still present.
    tokio::time::sleep(Duration::from_secs(59)).await;
    assert!(harness.stored(&listing.id).await.is_some());

    // Past the sweep: expired and removed outright.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(harness.stored(&listing.id).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_capture_cancels_sweep() {
    let harness = CheckoutHarness::new();
    let (listing, flow) = harness.checkout("Paid In Time", Plan::OneMonth).await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    harness.engine.capture(&flow, None).await.unwrap();

    tokio::time::sleep(Duration::from_secs(120)).await;

    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.status, ListingStatus::Verified);
}

#[tokio::test(start_paused = true)]
async fn test_verify_cancels_sweep() {
    let harness = CheckoutHarness::new();
    let (listing, flow) = harness.checkout("Verified In Time", Plan::OneMonth).await;

    harness.gateway.complete_order(&flow.order_id, "10.00").await;
    harness
        .engine
        .verify_order(&flow.order_id, &listing.id)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(120)).await;

    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.status, ListingStatus::Verified);
}

#[tokio::test(start_paused = true)]
async fn test_sweep_leaves_compensated_expired_listing() {
    let harness = CheckoutHarness::new();
    let listing = harness.create_listing("Failed Order", Plan::OneMonth).await;

    harness.gateway.fail_create_order(true).await;
    let _ = harness
        .engine
        .begin_checkout(
            &listing.id,
            CheckoutHarness::price(Plan::OneMonth),
            plaza::CheckoutAction::CreateListing,
            None,
            None,
        )
        .await;

    // The compensating transition already expired the listing; no sweep
    // is armed and the expired record stays for the owner to see.
    tokio::time::sleep(Duration::from_secs(120)).await;

    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.status, ListingStatus::Expired);
}

#[tokio::test(start_paused = true)]
async fn test_sweep_races_capture_benignly() {
    let harness = CheckoutHarness::new();
    let (listing, flow) = harness.checkout("Last Second", Plan::OneMonth).await;

    // Capture lands just before the sweep would fire.
    tokio::time::sleep(Duration::from_secs(59)).await;
    harness.engine.capture(&flow, None).await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    // The sweep (cancelled, and re-reading state in any case) leaves the
    // verified listing alone.
    let stored = harness.stored(&listing.id).await.unwrap();
    assert_eq!(stored.status, ListingStatus::Verified);
}

#[tokio::test(start_paused = true)]
async fn test_swept_listing_absent_from_all_reads() {
    let harness = CheckoutHarness::new();
    let (listing, _flow) = harness.checkout("Gone", Plan::OneMonth).await;

    tokio::time::sleep(Duration::from_secs(61)).await;

    assert!(harness.stored(&listing.id).await.is_none());
    let sub = harness.store.subscribe().await.unwrap();
    assert!(sub.snapshot.iter().all(|l| l.id != listing.id));
}
