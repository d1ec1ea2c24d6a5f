//! Pricing of estimate drafts.
//!
//! Everything here is pure: the same form always prices to the same total.

pub mod common;
pub mod pricing;

pub use pricing::{PriceBreakdown, compute_total, price_breakdown};
