//! Read-only JSON API over the loaded tables.
//!
//! Numeric query parameters that are not integers are ignored, as if they had
//! not been given. Empty string filters are ignored too.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::error;

use crate::{
    db::query::{self, DailyFilter, Listing, Page, PageRequest, YearlyFilter, YieldFilter},
    error::Error,
    reading::{DailyObservation, YearlyAggregate, YieldRecord},
};

pub const LIVENESS_MESSAGE: &str = "Weather API is running";

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

pub fn router(pool: SqlitePool) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/weather", get(weather))
        .route("/weather/stats", get(weather_stats))
        .route("/weather/yield", get(crop_yield))
        .with_state(AppState { pool })
}

pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        let body = Json(json!({ "error": self.0.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Raw query string values; parsed leniently so bad input falls back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    station: Option<String>,
    date: Option<String>,
    year: Option<String>,
    page: Option<String>,
    per_page: Option<String>,
}

impl Params {
    fn text(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn int(value: &Option<String>) -> Option<i64> {
        value.as_deref().and_then(|v| v.trim().parse().ok())
    }

    fn page_request(&self) -> PageRequest {
        PageRequest::new(Self::int(&self.page), Self::int(&self.per_page))
    }
}

async fn home() -> Json<Value> {
    Json(json!({ "message": LIVENESS_MESSAGE }))
}

async fn weather(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Page<DailyObservation>>, ApiError> {
    let filter = DailyFilter {
        station: Params::text(&params.station),
        date: Params::int(&params.date),
    };
    let page = query::daily(&state.pool, &filter, params.page_request()).await?;

    Ok(Json(page))
}

async fn weather_stats(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Page<YearlyAggregate>>, ApiError> {
    let filter = YearlyFilter {
        station: Params::text(&params.station),
        year: Params::int(&params.year),
    };
    let page = query::yearly(&state.pool, &filter, params.page_request()).await?;

    Ok(Json(page))
}

async fn crop_yield(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Listing<YieldRecord>>, ApiError> {
    let filter = YieldFilter {
        year: Params::int(&params.year),
    };
    let listing = query::yields(&state.pool, &filter).await?;

    Ok(Json(listing))
}

// -- Tests -------------------------------------------------------------------
