use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::cli::ServeArgs;
use crate::core::model::AircraftModel;
use crate::core::remote::RemoteAircraft;
use crate::matching::engine::{AircraftMatcher, MatchResult, ModelSetProvider, StatisticsProvider};
use crate::matching::log::{MatchingLog, MatchingMessage, MatchingMessages};
use crate::setup::MatcherSetup;

/// Request limits
pub const MAX_BODY_SIZE: usize = 64 * 1024;
pub const MAX_CALLSIGN_LENGTH: usize = 16;
pub const MAX_FIELD_LENGTH: usize = 256;

/// Shared application state
pub struct AppState {
    pub matcher: AircraftMatcher,
}

impl AppState {
    pub fn new(matcher: AircraftMatcher) -> Self {
        Self { matcher }
    }
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None,
    }
}

fn error_response(status: StatusCode, error_type: &str, message: &str) -> Response {
    (status, Json(create_safe_error_response(error_type, message, None))).into_response()
}

/// Remote aircraft as posted to `/api/match`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatchRequest {
    pub callsign: String,
    pub aircraft_icao: String,
    pub airline_icao: String,
    pub airline_name: String,
    pub telephony: String,
    pub livery: String,
    pub model_string: String,
    pub combined_type: Option<String>,
    /// Resolve the values against the database before matching
    pub reverse_lookup: bool,
    pub log: MatchingLog,
}

impl MatchRequest {
    fn validate(&self) -> Result<(), &'static str> {
        let callsign = self.callsign.trim();
        if callsign.is_empty() {
            return Err("Callsign is required");
        }
        if callsign.len() > MAX_CALLSIGN_LENGTH {
            return Err("Callsign is too long");
        }
        let fields = [
            &self.aircraft_icao,
            &self.airline_icao,
            &self.airline_name,
            &self.telephony,
            &self.livery,
            &self.model_string,
        ];
        if fields.iter().any(|f| f.len() > MAX_FIELD_LENGTH) {
            return Err("Field value is too long");
        }
        Ok(())
    }

    fn remote(&self) -> RemoteAircraft {
        let remote = RemoteAircraft::from_network(
            &self.callsign,
            &self.aircraft_icao,
            &self.airline_icao,
            &self.livery,
            &self.model_string,
        )
        .with_airline_name(&self.airline_name)
        .with_telephony(&self.telephony);
        match &self.combined_type {
            Some(combined_type) => remote.with_combined_type(combined_type),
            None => remote,
        }
    }
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub result: MatchResult,
    /// Remote values the match was computed for, after reverse lookup
    pub remote: AircraftModel,
    pub log: Vec<MatchingMessage>,
    pub processing_time_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
struct StatisticsParams {
    missing_only: Option<bool>,
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the matcher cannot be built, the tokio runtime cannot
/// be created or the server fails to start.
pub fn run(args: ServeArgs, verbose: bool) -> anyhow::Result<()> {
    let matcher = args.matcher.build_matcher(verbose)?;
    let state = Arc::new(AppState::new(matcher));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args, state).await })
}

/// Create the application router with routes and request limits.
///
/// Rate limiting needs the peer address and is added by the server.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/setup", get(get_setup_handler).put(put_setup_handler))
        .route("/api/match", post(match_handler))
        .route("/api/models", get(models_handler))
        .route(
            "/api/statistics",
            get(statistics_handler).delete(clear_statistics_handler),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("no-referrer"),
                ))
                // Request timeout, a matching script may hang
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(30),
                ))
                .layer(ConcurrencyLimitLayer::new(100))
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
}

async fn run_server(args: ServeArgs, state: Arc<AppState>) -> anyhow::Result<()> {
    // IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10)
        .burst_size(50)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?;

    let app = create_router(state).layer(GovernorLayer {
        config: Arc::new(governor_conf),
    });

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting model-matcher API at http://{addr}/api/setup");

    if args.open {
        let _ = open::that(format!("http://{addr}/api/models"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn get_setup_handler(State(state): State<Arc<AppState>>) -> Json<MatcherSetup> {
    Json(state.matcher.setup())
}

async fn put_setup_handler(
    State(state): State<Arc<AppState>>,
    Json(setup): Json<MatcherSetup>,
) -> Json<serde_json::Value> {
    let changed = state.matcher.set_setup(setup);
    Json(serde_json::json!({
        "changed": changed,
        "setup": state.matcher.setup(),
    }))
}

async fn match_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MatchRequest>,
) -> Response {
    if let Err(message) = request.validate() {
        return error_response(StatusCode::BAD_REQUEST, "invalid_request", message);
    }

    let start_time = std::time::Instant::now();
    // matching is CPU bound and may wait on a script process
    let joined = tokio::task::spawn_blocking(move || {
        let matcher = &state.matcher;
        let mut log = MatchingMessages::new();
        let mut remote = request.remote();
        if request.reverse_lookup {
            let model = matcher.reverse_lookup_model(&remote, request.log, Some(&mut log));
            remote = remote.with_model(model);
        }
        let result = matcher.get_closest_match(&remote, request.log, Some(&mut log));
        (result, remote.model, log)
    })
    .await;

    match joined {
        Ok((result, remote, log)) => {
            #[allow(clippy::cast_possible_truncation)] // Processing time won't exceed u64
            let processing_time_ms = start_time.elapsed().as_millis() as u64;
            Json(MatchResponse {
                result,
                remote,
                log: log.messages().to_vec(),
                processing_time_ms,
            })
            .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(create_safe_error_response(
                "matching_failed",
                "Matching failed",
                Some(&e.to_string()),
            )),
        )
            .into_response(),
    }
}

async fn models_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let catalog = state.matcher.model_set();
    let models: Vec<serde_json::Value> = catalog
        .models()
        .iter()
        .map(|m| {
            serde_json::json!({
                "model_string": m.model_string,
                "aircraft_icao": m.aircraft_icao.designator,
                "combined_type": m.combined_type(),
                "airline_icao": m.airline().designator,
                "livery": m.livery.combined_code,
                "db_key": m.db_key,
            })
        })
        .collect();

    Json(serde_json::json!({
        "simulator": catalog.simulator(),
        "count": models.len(),
        "disabled": catalog.disabled_models().len(),
        "default_model": catalog.default_model().map(|m| m.model_string.clone()),
        "models": models,
    }))
}

async fn statistics_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatisticsParams>,
) -> impl IntoResponse {
    Json(state.matcher.current_statistics(params.missing_only.unwrap_or(false)))
}

async fn clear_statistics_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.matcher.clear_matching_statistics();
    StatusCode::NO_CONTENT
}
