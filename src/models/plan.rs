//! Assembled answer for one planning request

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{TravelOption, TravelQuery};

/// Text produced by the language model, or why it is missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GeneratedText {
    Ready { text: String },
    Failed { message: String },
}

impl GeneratedText {
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            GeneratedText::Ready { text } => Some(text),
            GeneratedText::Failed { .. } => None,
        }
    }
}

impl<E: std::fmt::Display> From<Result<String, E>> for GeneratedText {
    fn from(result: Result<String, E>) -> Self {
        match result {
            Ok(text) => GeneratedText::Ready { text },
            Err(e) => GeneratedText::Failed {
                message: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TravelPlan {
    pub query: TravelQuery,
    /// Suggested travel options across modes
    pub recommendations: GeneratedText,
    /// Safety and planning tips for the destination
    pub tips: GeneratedText,
    /// Live directions for the requested mode
    pub live_travel: TravelOption,
    /// Static map image preview of the route
    pub map_url: String,
    pub generated_at: DateTime<Utc>,
}
