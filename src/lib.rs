pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod marketplace;
pub mod money;
pub mod store;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod mocks;

pub use config::{AppConfig, PlanPricing};
pub use error::{PlazaError, PlazaResult};
pub use gateway::outcome::CaptureOutcome;
pub use gateway::PayPalClient;
pub use lifecycle::{CheckoutAction, CheckoutFlow, LifecycleEngine, SweepScheduler, VerifyOutcome};
pub use marketplace::{
    BrowseIndex, Listing, ListingDetails, ListingDraft, ListingPatch, ListingStatus, Plan,
};
pub use money::Money;
pub use store::RtdbStore;
pub use traits::{
    ListingStore, ListingSubscription, PaymentGateway, StoreEvent, SystemTimeProvider,
    TimeProvider,
};
