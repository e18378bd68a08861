pub mod browse;
pub mod listing;
pub mod plan;
pub mod validate;

pub use browse::BrowseIndex;
pub use listing::{
    extended_expiry, Listing, ListingDetails, ListingDraft, ListingPatch, ListingStatus,
};
pub use plan::Plan;
pub use validate::{normalize_phone, validate_draft};
