//! Travel query model: what the user asked for

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TravelPlannerError;

/// Message shown when the form is submitted without both locations.
pub const MISSING_LOCATIONS_MESSAGE: &str =
    "Please enter both source and destination to continue.";

/// Travel modes understood by the directions service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub const ALL: [TravelMode; 4] = [
        TravelMode::Driving,
        TravelMode::Walking,
        TravelMode::Bicycling,
        TravelMode::Transit,
    ];

    /// Value sent on the wire as the `mode` parameter
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }

    /// Display name with only the first character capitalized
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut chars = self.as_str().chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = TravelPlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TravelMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                TravelPlannerError::validation(format!(
                    "Unknown travel mode '{s}'. Must be one of: driving, walking, bicycling, transit"
                ))
            })
    }
}

/// A single planning request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TravelQuery {
    source: String,
    destination: String,
    mode: TravelMode,
}

impl TravelQuery {
    /// Build a query, rejecting a blank source or destination.
    ///
    /// Values are otherwise kept verbatim; the directions service decides
    /// whether they name real places.
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        mode: TravelMode,
    ) -> crate::Result<Self> {
        let source = source.into();
        let destination = destination.into();

        if source.trim().is_empty() || destination.trim().is_empty() {
            return Err(TravelPlannerError::validation(MISSING_LOCATIONS_MESSAGE));
        }

        Ok(Self {
            source,
            destination,
            mode,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    #[must_use]
    pub fn mode(&self) -> TravelMode {
        self.mode
    }
}
