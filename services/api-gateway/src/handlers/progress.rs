use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use tendersheet_models::AnalyticsStats;

use crate::AppState;

/// GET /progress/:task_id
///
/// Unknown task ids answer with an empty object.
pub async fn get_progress(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Json<Value> {
    let progress = state
        .tracking
        .progress(&task_id)
        .and_then(|progress| serde_json::to_value(progress).ok())
        .unwrap_or_else(|| json!({}));
    Json(progress)
}

/// GET /analytics
pub async fn get_analytics(State(state): State<AppState>) -> Json<AnalyticsStats> {
    Json(state.tracking.analytics())
}
