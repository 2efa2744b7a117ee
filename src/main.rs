use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use route_risk::{
    Classifier, Config, HazardZoneRecord, RankedRoute, RiskAssessment, RiskError, Route, RouteReport,
    rank_routes,
};

#[derive(Debug, Parser)]
#[command(name = "route-risk", version, about = "Hazard-aware route risk analysis service")]
struct Cli {
    /// TOML config; built-in defaults when omitted.
    #[arg(long)]
    config: Option<String>,
}

// Shared State for concurrency
struct AppState {
    classifier: Classifier,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "route_risk=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // 1. Load configuration
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // 2. Build the classifier with the configured category policy
    let classifier = config.classifier()?;
    info!(
        categories = classifier.table().len(),
        index_threshold = config.analysis.index_threshold,
        "classifier ready"
    );

    let shared_state = Arc::new(AppState { classifier });

    info!("route risk API listening on http://{}", config.server.bind);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app(shared_state)).await?;

    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    // The presentation layer is served from elsewhere
    let cors = CorsLayer::new()
        .allow_methods(tower_http::cors::Any)
        .allow_origin(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/assess", post(assess_route))
        .route("/rank", post(rank_candidates))
        .route("/report", post(report_route))
        .layer(cors)
        .with_state(state)
}

// --- API DTOs ---

#[derive(Deserialize)]
struct AssessRequest {
    route: Route,
    #[serde(default)]
    zones: Vec<HazardZoneRecord>,
}

#[derive(Deserialize)]
struct RankRequest {
    routes: Vec<Route>,
    #[serde(default)]
    zones: Vec<HazardZoneRecord>,
}

#[derive(Serialize)]
struct RankResponse {
    /// Index of the default pick in the request's `routes`, absent for an empty batch.
    recommended: Option<usize>,
    ranking: Vec<RankedRoute>,
}

#[derive(Serialize)]
struct GeoJsonLineString {
    r#type: String,
    coordinates: Vec<[f64; 2]>, // [lon, lat] standard for GeoJSON
}

impl GeoJsonLineString {
    fn from_route(route: &Route) -> Self {
        Self {
            r#type: "LineString".to_string(),
            coordinates: route.line_string().coords().map(|c| [c.x, c.y]).collect(),
        }
    }
}

#[derive(Serialize)]
struct ReportResponse {
    report: String,
    geometry: GeoJsonLineString,
    assessment: RiskAssessment,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

enum ApiError {
    Risk(RiskError),
    Worker(tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Risk(err @ RiskError::InvalidZoneData { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            ApiError::Risk(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Worker(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("analysis worker failed: {err}")),
        };
        warn!(%status, error = %message, "request rejected");
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Runs analysis on the blocking pool; every handler goes through here.
async fn run_blocking<T, F>(state: Arc<AppState>, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&Classifier) -> route_risk::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || work(&state.classifier))
        .await
        .map_err(ApiError::Worker)?
        .map_err(ApiError::Risk)
}

// --- Handlers ---

async fn assess_route(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AssessRequest>,
) -> Result<Json<RiskAssessment>, ApiError> {
    let assessment = run_blocking(state, move |classifier| classifier.analyze(&payload.route, payload.zones)).await?;
    Ok(Json(assessment))
}

async fn rank_candidates(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RankRequest>,
) -> Result<Json<RankResponse>, ApiError> {
    let ranking = run_blocking(state, move |classifier| {
        rank_routes(classifier, &payload.routes, payload.zones)
    })
    .await?;
    info!(candidates = ranking.len(), "routes ranked");
    Ok(Json(RankResponse {
        recommended: ranking.first().map(|r| r.index),
        ranking,
    }))
}

async fn report_route(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AssessRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    let response = run_blocking(state, move |classifier| {
        let assessment = classifier.analyze(&payload.route, payload.zones)?;
        Ok(ReportResponse {
            report: RouteReport::new(&payload.route, &assessment).to_string(),
            geometry: GeoJsonLineString::from_route(&payload.route),
            assessment,
        })
    })
    .await?;
    Ok(Json(response))
}
