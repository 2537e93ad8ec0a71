//! Bidder Directory Handlers
//!
//! Lookup endpoints backing the bidder autocomplete in the generation form.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use tendersheet_models::{BidderStats, BidderSummary};
use tendersheet_store::DEFAULT_RECENT_DAYS;
use tendersheet_utils::TenderError;

use crate::middleware::{join_error, ApiError};
use crate::AppState;

const DEFAULT_SEARCH_LIMIT: usize = 10;
const DEFAULT_SUGGESTION_LIMIT: usize = 5;
const DEFAULT_POPULAR_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct UsageUpdate {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BiddersResponse {
    pub bidders: Vec<BidderSummary>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

/// GET /api/bidders/search?q=&limit=
pub async fn search_bidders(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<BiddersResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    Json(BiddersResponse {
        bidders: state.bidders.search(&params.q, limit),
    })
}

/// GET /api/bidders/suggestions?q=&limit=
pub async fn bidder_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SuggestionsResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT);
    Json(SuggestionsResponse {
        suggestions: state.bidders.suggestions(&params.q, limit),
    })
}

/// GET /api/bidders/recent?days=
pub async fn recent_bidders(
    State(state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> Json<BiddersResponse> {
    let days = params.days.unwrap_or(DEFAULT_RECENT_DAYS);
    Json(BiddersResponse {
        bidders: state.bidders.recent(days, Local::now().date_naive()),
    })
}

/// GET /api/bidders/popular?limit=
pub async fn popular_bidders(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Json<BiddersResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_POPULAR_LIMIT);
    Json(BiddersResponse {
        bidders: state.bidders.popular(limit, Local::now().date_naive()),
    })
}

pub async fn bidder_stats(State(state): State<AppState>) -> Json<BidderStats> {
    Json(state.bidders.stats(Local::now().date_naive()))
}

pub async fn all_bidders(State(state): State<AppState>) -> Json<BiddersResponse> {
    Json(BiddersResponse {
        bidders: state.bidders.all(),
    })
}

pub async fn bidders_by_location(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Json<BiddersResponse> {
    Json(BiddersResponse {
        bidders: state.bidders.by_location(&location),
    })
}

/// POST /api/bidders/usage
pub async fn record_bidder_usage(
    State(state): State<AppState>,
    Json(update): Json<UsageUpdate>,
) -> Result<Json<Value>, ApiError> {
    if update.name.trim().is_empty() {
        return Err(TenderError::validation("name", "Bidder name is required").into());
    }

    let bidders = state.bidders.clone();
    tokio::task::spawn_blocking(move || {
        bidders.record_usage(&update.name, update.address.as_deref(), Local::now().date_naive())
    })
    .await
    .map_err(join_error)??;

    Ok(Json(json!({ "success": true })))
}
