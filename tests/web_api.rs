//! HTTP API tests against the router, without a listening socket.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use model_matcher::db::memory::InMemoryDbCache;
use model_matcher::matching::MatchingLog;
use model_matcher::web::server::{create_router, AppState, MAX_BODY_SIZE};
use model_matcher::{
    AircraftIcaoCode, AircraftMatcher, AircraftModel, AirlineIcaoCode, Livery, MatcherSetup,
    MatchingAlgorithm, Simulator,
};

fn app() -> Router {
    let matcher = AircraftMatcher::new(Arc::new(InMemoryDbCache::empty()))
        .with_setup(MatcherSetup::new(MatchingAlgorithm::ReducePlusScore));
    let models = vec![
        AircraftModel::new(
            "A320_AUA",
            AircraftIcaoCode::new("A320").with_combined_type("L2J"),
            Livery::standard(&AirlineIcaoCode::new("AUA")),
        ),
        AircraftModel::new(
            "B738_DLH",
            AircraftIcaoCode::new("B738").with_combined_type("L2J"),
            Livery::standard(&AirlineIcaoCode::new("DLH")),
        ),
    ];
    matcher.set_model_set(models, Simulator::Msfs, true, MatchingLog::Nothing, None);
    create_router(Arc::new(AppState::new(matcher)))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_match_endpoint() {
    let (status, body) = send(
        app(),
        Method::POST,
        "/api/match",
        Some(json!({"callsign": "AUA123", "aircraft_icao": "A320", "airline_icao": "AUA", "log": "all"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["model"]["model_string"], "A320_AUA");
    assert_eq!(body["result"]["model"]["callsign"], "AUA123");
    assert!(!body["log"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_match_requires_callsign() {
    let (status, body) = send(
        app(),
        Method::POST,
        "/api/match",
        Some(json!({"aircraft_icao": "A320"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_request");
    assert!(body["details"].is_null());
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/match")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("x".repeat(MAX_BODY_SIZE + 1)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_security_headers() {
    let response = app()
        .oneshot(Request::builder().uri("/api/setup").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_setup_round_trip() {
    let app = app();
    let (status, setup) = send(app.clone(), Method::GET, "/api/setup", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(setup["algorithm"], "reduce_plus_score");

    let (_, unchanged) = send(app.clone(), Method::PUT, "/api/setup", Some(setup.clone())).await;
    assert_eq!(unchanged["changed"], false);

    let stepwise = serde_json::to_value(MatcherSetup::new(MatchingAlgorithm::StepwiseReduce)).unwrap();
    let (_, changed) = send(app.clone(), Method::PUT, "/api/setup", Some(stepwise)).await;
    assert_eq!(changed["changed"], true);

    let (_, setup) = send(app, Method::GET, "/api/setup", None).await;
    assert_eq!(setup["algorithm"], "stepwise_reduce");
}

#[tokio::test]
async fn test_models_endpoint() {
    let (status, body) = send(app(), Method::GET, "/api/models", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["simulator"], "msfs");
    assert_eq!(body["models"][0]["model_string"], "A320_AUA");
}

#[tokio::test]
async fn test_statistics_endpoints() {
    let app = app();
    for (callsign, aircraft, airline) in [("AUA1", "A320", "AUA"), ("SWR2", "A20N", "SWR")] {
        let (status, _) = send(
            app.clone(),
            Method::POST,
            "/api/match",
            Some(json!({"callsign": callsign, "aircraft_icao": aircraft, "airline_icao": airline})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, all) = send(app.clone(), Method::GET, "/api/statistics", None).await;
    assert_eq!(all["entries"].as_array().unwrap().len(), 2);

    let (_, missing) = send(app.clone(), Method::GET, "/api/statistics?missing_only=true", None).await;
    let missing = missing["entries"].as_array().unwrap().clone();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0]["airline_icao"], "SWR");

    let (status, _) = send(app.clone(), Method::DELETE, "/api/statistics", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, cleared) = send(app, Method::GET, "/api/statistics", None).await;
    assert!(cleared["entries"].as_array().unwrap().is_empty());
}
