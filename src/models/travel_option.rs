//! Normalized result of a directions lookup

use std::fmt;

use serde::{Deserialize, Serialize};

use super::TravelMode;

/// Price shown for every route. The directions service returns no fares, so
/// this is a fixed stub and must not be read as a real estimate.
pub const PLACEHOLDER_PRICE: &str = "$30 - $50 (estimated)";

/// Message used when the upstream reports a failure without explaining it.
pub const NO_ROUTE_MESSAGE: &str = "No valid route found.";

/// Why a directions lookup produced no route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network error, timeout or non-2xx HTTP status
    Transport,
    /// Well-formed response with a non-OK status
    UpstreamRejection,
    /// Body could not be decoded into the expected shape
    MalformedResponse,
}

/// Either a usable route summary or an error message, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TravelOption {
    Route {
        /// Display name of the travel mode, e.g. `Driving`
        mode: String,
        estimated_cost: String,
        duration: String,
        distance: String,
    },
    Unavailable {
        kind: FailureKind,
        message: String,
    },
}

impl TravelOption {
    /// Route summary for `mode` with the placeholder price
    pub fn route(
        mode: TravelMode,
        duration: impl Into<String>,
        distance: impl Into<String>,
    ) -> Self {
        TravelOption::Route {
            mode: mode.display_name(),
            estimated_cost: PLACEHOLDER_PRICE.to_string(),
            duration: duration.into(),
            distance: distance.into(),
        }
    }

    pub fn unavailable(kind: FailureKind, message: impl Into<String>) -> Self {
        TravelOption::Unavailable {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_route(&self) -> bool {
        matches!(self, TravelOption::Route { .. })
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            TravelOption::Route { .. } => None,
            TravelOption::Unavailable { message, .. } => Some(message),
        }
    }

    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            TravelOption::Route { .. } => None,
            TravelOption::Unavailable { kind, .. } => Some(*kind),
        }
    }
}

impl fmt::Display for TravelOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelOption::Route {
                mode,
                estimated_cost,
                duration,
                distance,
            } => write!(
                f,
                "{mode} → Cost: {estimated_cost}, Duration: {duration}, Distance: {distance}"
            ),
            TravelOption::Unavailable { message, .. } => write!(f, "Error: {message}"),
        }
    }
}
