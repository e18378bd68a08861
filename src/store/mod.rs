//! Listing persistence implementations.

pub mod rtdb;
pub mod sse;

pub use rtdb::RtdbStore;
