use serde::{Deserialize, Serialize};

use crate::marketplace::Plan;
use crate::money::Money;

/// Payment-gated visibility state of a listing.
///
/// Exactly one of these holds at any observation point; nothing else is
/// ever written to the `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Created, awaiting payment capture
    PendingPayment,
    /// Payment captured, publicly visible until expiry
    Verified,
    /// Payment never completed, or the paid period ran out
    Expired,
}

/// Free-form display attributes of a listing.
///
/// Opaque to the lifecycle logic; carried through every transition
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetails {
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub contact: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A marketplace listing, the unit of sale.
///
/// This is the persisted store record shape; field names below are the
/// wire names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Opaque identifier, generated at creation, immutable.
    pub id: String,

    pub status: ListingStatus,

    /// Duration tier that priced the current paid period. Legacy records
    /// without a plan fall back to one month.
    #[serde(default)]
    pub plan: Plan,

    /// Amount charged for the current plan.
    pub price: Money,

    /// Amount actually captured by the gateway; zero until capture
    /// succeeds. Never trusted from client input.
    pub price_paid: Money,

    /// Epoch milliseconds.
    pub created_at: u64,

    /// Epoch milliseconds; `None` means unset (legacy records) and counts
    /// as unexpired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,

    /// Principal that created the listing; required for mutation
    /// authorization.
    pub owner_id: String,

    #[serde(flatten)]
    pub details: ListingDetails,
}

/// Client-supplied input for creating a listing, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    pub owner_id: String,
    pub plan: Plan,
    #[serde(flatten)]
    pub details: ListingDetails,
}

impl Listing {
    /// Materialize a validated draft into a pending listing.
    ///
    /// The caller supplies the generated id, the price computed for the
    /// draft's plan, and the creation timestamp.
    pub fn from_draft(draft: ListingDraft, id: String, price: Money, now_ms: u64) -> Self {
        let expires_at = now_ms + draft.plan.duration_ms();
        Self {
            id,
            status: ListingStatus::PendingPayment,
            plan: draft.plan,
            price,
            price_paid: Money::ZERO,
            created_at: now_ms,
            expires_at: Some(expires_at),
            owner_id: draft.owner_id,
            details: draft.details,
        }
    }

    /// Whether the listing belongs in the public browse set at `now_ms`:
    /// verified, and not past its expiry (an unset expiry never expires).
    pub fn is_publicly_visible_at(&self, now_ms: u64) -> bool {
        self.status == ListingStatus::Verified
            && self.expires_at.is_none_or(|expiry| expiry > now_ms)
    }
}

/// Compute the expiry produced by extending from `current` at `now_ms`
/// with `plan`: the plan's duration on top of whichever is later, so an
/// active listing keeps its remaining time and a lapsed one restarts from
/// now.
pub fn extended_expiry(current: Option<u64>, now_ms: u64, plan: Plan) -> u64 {
    current.unwrap_or(0).max(now_ms) + plan.duration_ms()
}

/// Typed partial update for a listing's lifecycle fields.
///
/// Serializes to the exact field subset a store-level PATCH carries; the
/// display payload is never patched by lifecycle transitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_paid: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
}

impl ListingPatch {
    pub fn status(status: ListingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_price_paid(mut self, price_paid: Money) -> Self {
        self.price_paid = Some(price_paid);
        self
    }

    #[must_use]
    pub fn with_expires_at(mut self, expires_at: u64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    #[must_use]
    pub fn with_plan(mut self, plan: Plan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.price_paid.is_none()
            && self.expires_at.is_none()
            && self.plan.is_none()
    }

    /// Merge this patch into a listing record.
    pub fn apply(&self, listing: &mut Listing) {
        if let Some(status) = self.status {
            listing.status = status;
        }
        if let Some(price_paid) = self.price_paid {
            listing.price_paid = price_paid;
        }
        if let Some(expires_at) = self.expires_at {
            listing.expires_at = Some(expires_at);
        }
        if let Some(plan) = self.plan {
            listing.plan = plan;
        }
    }
}
