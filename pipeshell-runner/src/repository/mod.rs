//! Repository layer
//!
//! Repositories are stateless HTTP clients that abstract communication
//! with a collector. They are trait-based so the dispatch writer can be
//! exercised against in-memory fakes.

mod delivery;

pub use delivery::Delivery;
pub use delivery::HttpDelivery;
