//! Data models for the `TravelPlanner` service
//!
//! This module contains the core domain models organized by concern:
//! - Query: the source/destination/mode triple submitted by the user
//! - Travel option: the normalized directions result
//! - Plan: everything returned for one submission

pub mod plan;
pub mod query;
pub mod travel_option;

// Re-export all public types for convenient access
pub use plan::{GeneratedText, TravelPlan};
pub use query::{MISSING_LOCATIONS_MESSAGE, TravelMode, TravelQuery};
pub use travel_option::{FailureKind, NO_ROUTE_MESSAGE, PLACEHOLDER_PRICE, TravelOption};
