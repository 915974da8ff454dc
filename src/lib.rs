//! `TravelPlanner` - AI-assisted travel planning
//!
//! This library combines generated travel recommendations with live
//! directions data and a static map preview for a source/destination pair.

pub mod api;
pub mod config;
pub mod directions;
pub mod error;
pub mod models;
pub mod planner;
pub mod recommendations;
pub mod static_map;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use config::PlannerConfig;
pub use directions::DirectionsClient;
pub use error::TravelPlannerError;
pub use models::{FailureKind, GeneratedText, TravelMode, TravelOption, TravelPlan, TravelQuery};
pub use planner::TravelPlanner;
pub use recommendations::{GeminiClient, RecommendationService};
pub use static_map::StaticMapBuilder;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelPlannerError>;
