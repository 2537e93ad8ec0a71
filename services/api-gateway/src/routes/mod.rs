use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers::*, AppState};

pub fn create_tender_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_file))
        .route("/generate", post(generate_templates))
        .route("/download/:filename", get(download_file))
        .route("/progress/:task_id", get(get_progress))
        .route("/analytics", get(get_analytics))
}

pub fn create_bidder_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_bidders))
        .route("/suggestions", get(bidder_suggestions))
        .route("/recent", get(recent_bidders))
        .route("/popular", get(popular_bidders))
        .route("/stats", get(bidder_stats))
        .route("/all", get(all_bidders))
        .route("/location/:location", get(bidders_by_location))
        .route("/usage", post(record_bidder_usage))
}
