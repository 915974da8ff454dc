//! Google Gemini `generateContent` client

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use super::{RecommendationService, recommendations_prompt, tips_prompt};
use crate::config::GeminiConfig;
use crate::{Result, TravelPlannerError};

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

impl GeminiClient {
    /// Create a client, resolving the API key from the configuration
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .resolve_api_key()
            .map_err(|e| TravelPlannerError::config(format!("{e:#}")))?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &GeminiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("TravelPlanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TravelPlannerError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    /// Send one prompt and return the text of the first candidate
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let start_time = Instant::now();
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(&self.api_key)
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!("Sending prompt of {} chars to Gemini", prompt.len());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TravelPlannerError::api(format!("Gemini request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TravelPlannerError::api(format!("Failed to read Gemini response: {}", e.without_url())))?;

        if !status.is_success() {
            error!("Gemini API error: {} - {}", status, body);
            return Err(TravelPlannerError::api(format!("Gemini API returned HTTP {status}")));
        }

        let text = extract_text(&body)?;

        info!(
            "Gemini answered with {} chars in {:.3}s",
            text.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(text)
    }
}

fn extract_text(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body).map_err(|e| {
        error!("Failed to parse Gemini response: {}", e);
        TravelPlannerError::parse(format!("Invalid Gemini response: {e}"))
    })?;

    if let Some(usage) = &response.usage_metadata {
        debug!(
            "Gemini usage - prompt: {:?} tokens, response: {:?} tokens",
            usage.prompt_token_count, usage.candidates_token_count
        );
    }

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or_else(|| TravelPlannerError::parse("Gemini response contained no text"))
}

#[async_trait]
impl RecommendationService for GeminiClient {
    async fn travel_recommendations(&self, source: &str, destination: &str) -> Result<String> {
        self.generate(&recommendations_prompt(source, destination)).await
    }

    async fn travel_tips(&self, destination: &str) -> Result<String> {
        self.generate(&tips_prompt(destination)).await
    }
}
