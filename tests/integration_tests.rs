//! Integration tests for TravelPlanner against in-process stub upstreams

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode, Uri},
    routing::get,
};
use http_body_util::BodyExt;
use rstest::rstest;
use tower::ServiceExt;

use travelplanner::config::{GeminiConfig, MapsConfig};
use travelplanner::models::{MISSING_LOCATIONS_MESSAGE, NO_ROUTE_MESSAGE, PLACEHOLDER_PRICE};
use travelplanner::{
    DirectionsClient, FailureKind, GeminiClient, GeneratedText, RecommendationService,
    StaticMapBuilder, TravelMode, TravelOption, TravelPlanner, TravelPlannerError, TravelQuery,
    web,
};

const API_KEY: &str = "test-maps-key";

const OK_BODY: &str = r#"{
    "status": "OK",
    "routes": [{"legs": [{
        "duration": {"text": "4 hours 10 mins", "value": 15000},
        "distance": {"text": "412 km", "value": 412000}
    }]}]
}"#;

#[derive(Clone)]
struct DirectionsStub {
    status: StatusCode,
    body: &'static str,
    delay: Duration,
    seen: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl DirectionsStub {
    fn new(status: StatusCode, body: &'static str) -> Self {
        Self {
            status,
            body,
            delay: Duration::ZERO,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requests(&self) -> Vec<HashMap<String, String>> {
        self.seen.lock().unwrap().clone()
    }
}

async fn directions_handler(
    State(stub): State<DirectionsStub>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, &'static str) {
    stub.seen.lock().unwrap().push(params);
    if !stub.delay.is_zero() {
        tokio::time::sleep(stub.delay).await;
    }
    (stub.status, stub.body)
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn spawn_directions(stub: DirectionsStub) -> MapsConfig {
    let router = Router::new()
        .route("/maps/api/directions/json", get(directions_handler))
        .with_state(stub);
    let addr = serve(router).await;
    maps_config(addr)
}

fn maps_config(addr: SocketAddr) -> MapsConfig {
    MapsConfig {
        directions_url: format!("http://{addr}/maps/api/directions/json"),
        timeout_seconds: 5,
        ..MapsConfig::default()
    }
}

/// Address nothing is listening on
async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

fn query(mode: TravelMode) -> TravelQuery {
    TravelQuery::new("Munich", "Vienna, Austria", mode).unwrap()
}

#[rstest]
#[case(TravelMode::Driving, "driving")]
#[case(TravelMode::Walking, "walking")]
#[case(TravelMode::Bicycling, "bicycling")]
#[case(TravelMode::Transit, "transit")]
#[tokio::test]
async fn test_request_parameters_match_query(#[case] mode: TravelMode, #[case] wire: &str) {
    let stub = DirectionsStub::new(StatusCode::OK, OK_BODY);
    let config = spawn_directions(stub.clone()).await;
    let client = DirectionsClient::with_api_key(&config, API_KEY).unwrap();

    client.fetch_travel_option(&query(mode)).await;

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    let params = &requests[0];
    assert_eq!(params["mode"], wire);
    assert_eq!(params["origin"], "Munich");
    assert_eq!(params["destination"], "Vienna, Austria");
    assert_eq!(params["key"], API_KEY);
}

#[tokio::test]
async fn test_ok_response_yields_route() {
    let config = spawn_directions(DirectionsStub::new(StatusCode::OK, OK_BODY)).await;
    let client = DirectionsClient::with_api_key(&config, API_KEY).unwrap();

    let option = client.fetch_travel_option(&query(TravelMode::Driving)).await;

    assert_eq!(
        option,
        TravelOption::Route {
            mode: "Driving".to_string(),
            estimated_cost: PLACEHOLDER_PRICE.to_string(),
            duration: "4 hours 10 mins".to_string(),
            distance: "412 km".to_string(),
        }
    );
}

#[tokio::test]
async fn test_zero_results_uses_fallback_message() {
    let config = spawn_directions(DirectionsStub::new(
        StatusCode::OK,
        r#"{"status": "ZERO_RESULTS", "routes": []}"#,
    ))
    .await;
    let client = DirectionsClient::with_api_key(&config, API_KEY).unwrap();

    let option = client.fetch_travel_option(&query(TravelMode::Transit)).await;

    assert_eq!(
        option,
        TravelOption::Unavailable {
            kind: FailureKind::UpstreamRejection,
            message: NO_ROUTE_MESSAGE.to_string(),
        }
    );
}

#[tokio::test]
async fn test_request_denied_surfaces_upstream_message() {
    let config = spawn_directions(DirectionsStub::new(
        StatusCode::OK,
        r#"{"status": "REQUEST_DENIED", "error_message": "Invalid API key", "routes": []}"#,
    ))
    .await;
    let client = DirectionsClient::with_api_key(&config, "wrong").unwrap();

    let option = client.fetch_travel_option(&query(TravelMode::Driving)).await;

    assert_eq!(option.error_message(), Some("Invalid API key"));
    assert_eq!(option.failure_kind(), Some(FailureKind::UpstreamRejection));
}

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    let config = maps_config(closed_addr().await);
    let client = DirectionsClient::with_api_key(&config, API_KEY).unwrap();

    let option = client.fetch_travel_option(&query(TravelMode::Walking)).await;

    assert_eq!(option.failure_kind(), Some(FailureKind::Transport));
    let message = option.error_message().unwrap();
    assert!(message.starts_with("Google Maps API Error: "));
    assert!(message.contains("connection failed"));
    assert!(!message.contains(API_KEY));
}

#[tokio::test]
async fn test_short_api_key_leaves_message_intact() {
    let config = maps_config(closed_addr().await);
    let client = DirectionsClient::with_api_key(&config, "k").unwrap();

    let option = client.fetch_travel_option(&query(TravelMode::Driving)).await;

    let message = option.error_message().unwrap();
    assert!(message.starts_with("Google Maps API Error: connection failed"));
    assert!(!message.contains("***"));
    assert!(!message.contains("key="));
    assert!(!message.contains(&config.directions_url));
}

#[tokio::test]
async fn test_server_error_status_is_transport_error() {
    let stub = DirectionsStub::new(StatusCode::INTERNAL_SERVER_ERROR, OK_BODY);
    let config = spawn_directions(stub.clone()).await;
    let client = DirectionsClient::with_api_key(&config, API_KEY).unwrap();

    let option = client.fetch_travel_option(&query(TravelMode::Driving)).await;

    assert_eq!(option.failure_kind(), Some(FailureKind::Transport));
    assert!(option.error_message().unwrap().contains("HTTP status 500"));
    // no retries unless configured
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn test_configured_retry_repeats_transient_failures() {
    let stub = DirectionsStub::new(StatusCode::SERVICE_UNAVAILABLE, "");
    let mut config = spawn_directions(stub.clone()).await;
    config.max_retries = 1;
    let client = DirectionsClient::with_api_key(&config, API_KEY).unwrap();

    let option = client.fetch_travel_option(&query(TravelMode::Driving)).await;

    assert_eq!(option.failure_kind(), Some(FailureKind::Transport));
    assert!(option.error_message().unwrap().contains("HTTP status 503"));
    assert_eq!(stub.requests().len(), 2);
}

#[tokio::test]
async fn test_exhausted_retries_keep_underlying_cause() {
    let mut config = maps_config(closed_addr().await);
    config.max_retries = 1;
    let client = DirectionsClient::with_api_key(&config, API_KEY).unwrap();

    let option = client.fetch_travel_option(&query(TravelMode::Driving)).await;

    assert_eq!(option.failure_kind(), Some(FailureKind::Transport));
    let message = option.error_message().unwrap();
    assert!(message.contains("Request failed after"), "{message}");
    assert!(message.contains("connection failed"), "{message}");
    assert!(!message.contains(API_KEY));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let mut stub = DirectionsStub::new(StatusCode::OK, OK_BODY);
    stub.delay = Duration::from_secs(3);
    let mut config = spawn_directions(stub).await;
    config.timeout_seconds = 1;
    let client = DirectionsClient::with_api_key(&config, API_KEY).unwrap();

    let option = client.fetch_travel_option(&query(TravelMode::Driving)).await;

    assert_eq!(option.failure_kind(), Some(FailureKind::Transport));
}

#[tokio::test]
async fn test_non_json_body_is_malformed_response() {
    let config = spawn_directions(DirectionsStub::new(
        StatusCode::OK,
        "<html><body>Oops</body></html>",
    ))
    .await;
    let client = DirectionsClient::with_api_key(&config, API_KEY).unwrap();

    let option = client.fetch_travel_option(&query(TravelMode::Bicycling)).await;

    assert_eq!(option.failure_kind(), Some(FailureKind::MalformedResponse));
    assert!(option.error_message().unwrap().starts_with("Invalid response: "));
}

#[tokio::test]
async fn test_repeated_lookups_are_identical() {
    let config = spawn_directions(DirectionsStub::new(StatusCode::OK, OK_BODY)).await;
    let client = DirectionsClient::with_api_key(&config, API_KEY).unwrap();
    let query = query(TravelMode::Driving);

    let first = client.fetch_travel_option(&query).await;
    let second = client.fetch_travel_option(&query).await;

    assert_eq!(first, second);
}

// ---- language model ----

#[derive(Clone, Default)]
struct GeminiStub {
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

async fn gemini_handler(State(stub): State<GeminiStub>, uri: Uri, body: String) -> String {
    stub.seen.lock().unwrap().push((uri.to_string(), body));
    r#"{"candidates": [{"content": {"parts": [{"text": "Take the night train."}]}}]}"#.to_string()
}

#[tokio::test]
async fn test_gemini_client_sends_prompt_and_reads_answer() {
    let stub = GeminiStub::default();
    let addr = serve(Router::new().fallback(gemini_handler).with_state(stub.clone())).await;
    let config = GeminiConfig {
        base_url: format!("http://{addr}/v1beta/models"),
        model: "gemini-test".to_string(),
        ..GeminiConfig::default()
    };
    let client = GeminiClient::with_api_key(&config, "llm-key").unwrap();

    let text = client.travel_tips("Reykjavik").await.unwrap();

    assert_eq!(text, "Take the night train.");
    let seen = stub.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    let (uri, body) = &seen[0];
    assert_eq!(uri, "/v1beta/models/gemini-test:generateContent?key=llm-key");
    let body: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        body["contents"][0]["parts"][0]["text"],
        "Suggest 3 travel safety or planning tips for someone visiting Reykjavik."
    );
}

#[tokio::test]
async fn test_gemini_client_reports_http_errors() {
    let router = Router::new().fallback(|| async { (StatusCode::FORBIDDEN, "denied") });
    let addr = serve(router).await;
    let config = GeminiConfig {
        base_url: format!("http://{addr}/v1beta/models"),
        ..GeminiConfig::default()
    };
    let client = GeminiClient::with_api_key(&config, "llm-key").unwrap();

    let err = client.travel_recommendations("A", "B").await.unwrap_err();

    assert!(matches!(err, TravelPlannerError::Api { .. }));
    assert!(err.to_string().contains("403"));
}

// ---- planner ----

struct CannedRecommendations {
    fail: bool,
    calls: AtomicUsize,
}

impl CannedRecommendations {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            fail,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl RecommendationService for CannedRecommendations {
    async fn travel_recommendations(
        &self,
        source: &str,
        destination: &str,
    ) -> travelplanner::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TravelPlannerError::api("model unavailable"));
        }
        Ok(format!("Fly from {source} to {destination}."))
    }

    async fn travel_tips(&self, destination: &str) -> travelplanner::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TravelPlannerError::api("model unavailable"));
        }
        Ok(format!("Carry cash in {destination}."))
    }
}

fn planner(config: &MapsConfig, recommendations: Arc<CannedRecommendations>) -> TravelPlanner {
    TravelPlanner::new(
        recommendations,
        DirectionsClient::with_api_key(config, API_KEY).unwrap(),
        StaticMapBuilder::new(config, API_KEY),
    )
}

#[tokio::test]
async fn test_plan_combines_all_sources() {
    let config = spawn_directions(DirectionsStub::new(StatusCode::OK, OK_BODY)).await;
    let recommendations = CannedRecommendations::new(false);
    let planner = planner(&config, recommendations.clone());

    let plan = planner
        .plan("Munich", "Vienna", TravelMode::Driving)
        .await
        .unwrap();

    assert_eq!(plan.recommendations.text(), Some("Fly from Munich to Vienna."));
    assert_eq!(plan.tips.text(), Some("Carry cash in Vienna."));
    assert!(plan.live_travel.is_route());
    assert!(plan.map_url.contains("markers=Munich&markers=Vienna"));
    assert_eq!(plan.query.source(), "Munich");
    assert_eq!(recommendations.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_plan_keeps_route_when_model_fails() {
    let config = spawn_directions(DirectionsStub::new(StatusCode::OK, OK_BODY)).await;
    let planner = planner(&config, CannedRecommendations::new(true));

    let plan = planner
        .plan("Munich", "Vienna", TravelMode::Transit)
        .await
        .unwrap();

    assert_eq!(
        plan.recommendations,
        GeneratedText::Failed {
            message: "API error: model unavailable".to_string()
        }
    );
    assert!(plan.tips.text().is_none());
    assert!(plan.live_travel.is_route());
}

#[rstest]
#[case("", "Vienna")]
#[case("Munich", "  ")]
#[tokio::test]
async fn test_blank_input_never_reaches_upstreams(#[case] source: &str, #[case] destination: &str) {
    let stub = DirectionsStub::new(StatusCode::OK, OK_BODY);
    let config = spawn_directions(stub.clone()).await;
    let recommendations = CannedRecommendations::new(false);
    let planner = planner(&config, recommendations.clone());

    let err = planner
        .plan(source, destination, TravelMode::Driving)
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), MISSING_LOCATIONS_MESSAGE);
    assert!(stub.requests().is_empty());
    assert_eq!(recommendations.calls.load(Ordering::SeqCst), 0);
}

// ---- HTTP API ----

async fn call(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_api_health() {
    let config = maps_config(closed_addr().await);
    let app = web::app(planner(&config, CannedRecommendations::new(false)));

    let (status, body) = call(app, "GET", "/api/health", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_api_plan() {
    let config = spawn_directions(DirectionsStub::new(StatusCode::OK, OK_BODY)).await;
    let app = web::app(planner(&config, CannedRecommendations::new(false)));

    let (status, body) = call(
        app,
        "POST",
        "/api/plan",
        r#"{"source": "Munich", "destination": "Vienna", "mode": "walking"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["live_travel"]["status"], "route");
    assert_eq!(body["live_travel"]["mode"], "Walking");
    assert_eq!(body["recommendations"]["text"], "Fly from Munich to Vienna.");
    assert_eq!(body["query"]["mode"], "walking");
}

#[tokio::test]
async fn test_api_plan_rejects_blank_input() {
    let config = maps_config(closed_addr().await);
    let app = web::app(planner(&config, CannedRecommendations::new(false)));

    let (status, body) = call(
        app,
        "POST",
        "/api/plan",
        r#"{"source": "", "destination": "Vienna"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], MISSING_LOCATIONS_MESSAGE);
}

#[tokio::test]
async fn test_api_directions_reports_failures_in_body() {
    let config = maps_config(closed_addr().await);
    let app = web::app(planner(&config, CannedRecommendations::new(false)));

    let (status, body) = call(
        app,
        "POST",
        "/api/directions",
        r#"{"source": "Munich", "destination": "Vienna", "mode": "driving"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unavailable");
    assert_eq!(body["kind"], "transport");
}

#[tokio::test]
async fn test_api_rejects_unknown_mode() {
    let config = maps_config(closed_addr().await);
    let app = web::app(planner(&config, CannedRecommendations::new(false)));

    let (status, body) = call(
        app,
        "POST",
        "/api/plan",
        r#"{"source": "Munich", "destination": "Vienna", "mode": "teleport"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Unknown travel mode 'teleport'")
    );
}
