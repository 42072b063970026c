use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use garden_planner::catalog;
use garden_planner::error::PlanError;
use garden_planner::solver::{SearchOutcome, Solver};
use garden_planner::types::{Crop, PackingResult, PlannerConfig, Ratio};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct PlanRequest {
    /// Defaults to the built-in per-person list.
    #[serde(default)]
    crops: Option<Vec<Crop>>,
    #[serde(flatten)]
    config: PlannerConfig,
    /// Evaluate this multiplier only instead of searching.
    #[serde(default)]
    multiplier: Option<f64>,
}

#[derive(Serialize)]
struct PlanResponse {
    multiplier: f64,
    boundary: Option<Ratio>,
    trials: u32,
    waste_percent: f64,
    result: PackingResult,
}

impl PlanResponse {
    fn new(multiplier: f64, boundary: Option<Ratio>, trials: u32, result: PackingResult) -> Self {
        Self {
            multiplier,
            boundary,
            trials,
            waste_percent: result.waste_percent(),
            result,
        }
    }
}

impl From<SearchOutcome> for PlanResponse {
    fn from(outcome: SearchOutcome) -> Self {
        Self::new(
            outcome.multiplier,
            outcome.boundary,
            outcome.trials,
            outcome.result,
        )
    }
}

fn error_status(e: &PlanError) -> StatusCode {
    match e {
        PlanError::InvalidInput(_) | PlanError::Io(_) | PlanError::Json(_) => {
            StatusCode::BAD_REQUEST
        }
        PlanError::SearchExhausted { .. } | PlanError::NoFeasiblePacking => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

async fn plan(Json(req): Json<PlanRequest>) -> Result<Json<PlanResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /plan"
    );

    let crops = req.crops.unwrap_or_else(catalog::baseline_crops);
    let solver = Solver::new(crops, req.config).map_err(|e| (error_status(&e), e.to_string()))?;

    let response = match req.multiplier {
        Some(x) if !x.is_finite() || x < 0.0 => {
            return Err((
                StatusCode::BAD_REQUEST,
                "multiplier must be a non-negative number".to_string(),
            ));
        }
        Some(x) => {
            let result = solver
                .evaluate(x)
                .map_err(|reason| (StatusCode::UNPROCESSABLE_ENTITY, reason.to_string()))?;
            PlanResponse::new(x, None, 1, result)
        }
        None => solver
            .solve()
            .map_err(|e| (error_status(&e), e.to_string()))?
            .into(),
    };

    Ok(Json(response))
}

#[tokio::main]
async fn main() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/plan", post(plan))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
