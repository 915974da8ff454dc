//! Travel recommendations from a generative language model
//!
//! Two fixed prompts are sent to the model: one asking for travel options
//! between two places and one asking for tips about the destination. The
//! answers are passed through as plain text.

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::Result;

/// Source of generated travel advice
#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Travel options (cab, bus, train, flight) with costs and durations
    async fn travel_recommendations(&self, source: &str, destination: &str) -> Result<String>;

    /// Safety and planning tips for visiting `destination`
    async fn travel_tips(&self, destination: &str) -> Result<String>;
}

#[must_use]
pub fn recommendations_prompt(source: &str, destination: &str) -> String {
    format!(
        "You are an AI travel assistant. Provide the best travel options from {source} to {destination}.\n\
         Include different travel modes (cab, bus, train, flight) with estimated costs.\n\
         Also include estimated travel duration for each mode. Format the response in a structured manner."
    )
}

#[must_use]
pub fn tips_prompt(destination: &str) -> String {
    format!("Suggest 3 travel safety or planning tips for someone visiting {destination}.")
}
