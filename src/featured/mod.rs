//! Featured Module
//!
//! Deterministic daily rotation of catalog entries.

mod selector;
mod shuffle;

pub use selector::{fallback_featured, FeaturedSelector};
pub use shuffle::{daily_seed, seeded_shuffle, Lcg};
