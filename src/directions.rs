//! Directions client for the Google Maps Directions API
//!
//! Turns a [`TravelQuery`] into one directions request and normalizes
//! whatever comes back (a route, an upstream rejection, a transport failure
//! or an unreadable body) into a [`TravelOption`]. Nothing escapes this
//! boundary as an error.

use std::time::Instant;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryError, RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::MapsConfig;
use crate::models::{FailureKind, NO_ROUTE_MESSAGE, TravelMode, TravelOption, TravelQuery};
use crate::{Result, TravelPlannerError};

const OK_STATUS: &str = "OK";

/// Client for the directions endpoint. Holds no per-request state and can be
/// shared between concurrent requests.
#[derive(Clone)]
pub struct DirectionsClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl DirectionsClient {
    /// Create a client, resolving the API key from the configuration
    pub fn new(config: &MapsConfig) -> Result<Self> {
        let api_key = config
            .resolve_api_key()
            .map_err(|e| TravelPlannerError::config(format!("{e:#}")))?;
        Self::with_api_key(config, api_key)
    }

    /// Create a client with an explicitly supplied API key
    pub fn with_api_key(config: &MapsConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("TravelPlanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TravelPlannerError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.directions_url.clone(),
            api_key: api_key.into(),
        })
    }

    /// Look up directions for `query` and normalize the outcome
    #[instrument(skip(self), fields(mode = %query.mode()))]
    pub async fn fetch_travel_option(&self, query: &TravelQuery) -> TravelOption {
        let start_time = Instant::now();

        let option = match self.request(query).await {
            Ok(body) => parse_directions(query.mode(), &body),
            Err(e) => TravelOption::unavailable(
                FailureKind::Transport,
                format!("Google Maps API Error: {}", describe_transport_error(&e)),
            ),
        };

        if option.is_route() {
            info!("{} in {:.3}s", option, start_time.elapsed().as_secs_f64());
        } else {
            warn!("No route available: {}", option);
        }

        option
    }

    async fn request(&self, query: &TravelQuery) -> std::result::Result<String, reqwest_middleware::Error> {
        let url = self.request_url(query);
        debug!("Calling the directions API at {}", self.base_url);

        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }

    fn request_url(&self, query: &TravelQuery) -> String {
        format!(
            "{}?origin={}&destination={}&key={}&mode={}",
            self.base_url,
            urlencoding::encode(query.source()),
            urlencoding::encode(query.destination()),
            urlencoding::encode(&self.api_key),
            query.mode().as_str()
        )
    }
}

/// Describe a failed request without the request URL, which carries the
/// API key. Retry wrappers keep their prefix and the cause underneath.
fn describe_transport_error(err: &reqwest_middleware::Error) -> String {
    match err {
        reqwest_middleware::Error::Reqwest(e) => describe_reqwest_error(e),
        reqwest_middleware::Error::Middleware(e) => match e.downcast_ref::<RetryError>() {
            Some(retry @ RetryError::WithRetries { err, .. }) => {
                format!("{retry}: {}", describe_transport_error(err))
            }
            Some(RetryError::Error(err)) => describe_transport_error(err),
            None => format!("{e:#}"),
        },
    }
}

fn describe_reqwest_error(err: &reqwest::Error) -> String {
    let summary = if let Some(status) = err.status() {
        format!("HTTP status {status}")
    } else if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else if err.is_body() || err.is_decode() {
        "failed to read response body".to_string()
    } else {
        "request failed".to_string()
    };

    let mut parts = vec![summary];
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

/// Decode a directions response body and normalize it
pub fn parse_directions(mode: TravelMode, body: &str) -> TravelOption {
    match serde_json::from_str::<DirectionsResponse>(body) {
        Ok(response) => response.into_travel_option(mode),
        Err(e) => TravelOption::unavailable(
            FailureKind::MalformedResponse,
            format!("Invalid response: {e}"),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<RouteResponse>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    legs: Vec<LegResponse>,
}

#[derive(Debug, Deserialize)]
struct LegResponse {
    duration: TextValue,
    distance: TextValue,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
}

impl DirectionsResponse {
    fn into_travel_option(self, mode: TravelMode) -> TravelOption {
        if self.status != OK_STATUS {
            let message = self
                .error_message
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| NO_ROUTE_MESSAGE.to_string());
            return TravelOption::unavailable(FailureKind::UpstreamRejection, message);
        }

        // alternatives and later legs are ignored
        let first_leg = self
            .routes
            .into_iter()
            .next()
            .and_then(|route| route.legs.into_iter().next());

        match first_leg {
            Some(leg) => TravelOption::route(mode, leg.duration.text, leg.distance.text),
            None => TravelOption::unavailable(FailureKind::UpstreamRejection, NO_ROUTE_MESSAGE),
        }
    }
}
