pub mod harness;

pub use harness::CheckoutHarness;
