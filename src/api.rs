//! JSON API consumed by the front end

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::models::{TravelMode, TravelOption, TravelPlan};
use crate::planner::TravelPlanner;
use crate::{TravelPlannerError, VERSION};

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
    /// Wire name of the travel mode; driving when absent
    #[serde(default)]
    pub mode: Option<String>,
}

impl PlanRequest {
    fn travel_mode(&self) -> Result<TravelMode, TravelPlannerError> {
        self.mode
            .as_deref()
            .map(str::parse::<TravelMode>)
            .transpose()
            .map(Option::unwrap_or_default)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

type ApiError = (StatusCode, Json<ApiErrorBody>);

pub fn router(planner: TravelPlanner) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/plan", post(plan))
        .route("/directions", post(directions))
        .with_state(planner)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
    })
}

async fn plan(
    State(planner): State<TravelPlanner>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<TravelPlan>, ApiError> {
    let mode = request.travel_mode().map_err(to_api_error)?;
    planner
        .plan(&request.source, &request.destination, mode)
        .await
        .map(Json)
        .map_err(to_api_error)
}

async fn directions(
    State(planner): State<TravelPlanner>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<TravelOption>, ApiError> {
    let mode = request.travel_mode().map_err(to_api_error)?;
    planner
        .live_travel(&request.source, &request.destination, mode)
        .await
        .map(Json)
        .map_err(to_api_error)
}

fn to_api_error(err: TravelPlannerError) -> ApiError {
    let status = match err {
        TravelPlannerError::Validation { .. } => StatusCode::BAD_REQUEST,
        _ => {
            error!("Request failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ApiErrorBody {
            error: err.user_message(),
        }),
    )
}
