//! Generation Handler
//!
//! Validates the bidder-enriched tender, stamps bidder usage and writes the
//! four templates plus their zip under the output root.

use axum::{extract::State, response::Json};
use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use tendersheet_models::{GenerationRequest, TenderDraft};
use tendersheet_store::BidderDirectory;
use tendersheet_utils::{validate_generation_request, TenderError};

use crate::middleware::{join_error, ApiError};
use crate::AppState;

const GENERATION_EVENT: &str = "template_generation";

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub download_url: String,
    pub files: Vec<String>,
    pub zip_file: String,
}

/// POST /generate
pub async fn generate_templates(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let draft = request
        .data
        .ok_or_else(|| TenderError::input("No data provided"))?;
    let record = validate_generation_request(&draft)?;

    let bidders = state.bidders.clone();
    let generator = state.generator.clone();
    let output_root = state.config.storage.output_dir.clone();
    let tracking = state.tracking.clone();

    let generated = tokio::task::spawn_blocking(move || {
        record_bidder_usage(&bidders, &draft);
        let generated = generator.generate_bundle(&record, &output_root);
        tracking.record_event(GENERATION_EVENT, generated.is_ok(), None);
        generated
    })
    .await
    .map_err(join_error)?;

    state.metrics.record_generation(generated.is_ok());

    let bundle = generated?;
    let zip_file = bundle.archive_name();
    info!(archive = %zip_file, files = bundle.files.len(), "Generation complete");

    Ok(Json(GenerateResponse {
        success: true,
        download_url: format!("/download/{}", zip_file),
        files: bundle.file_names(),
        zip_file,
    }))
}

/// Only bidders the user actually named are stamped; placeholder names for
/// unnamed rows never reach the directory.
fn record_bidder_usage(directory: &BidderDirectory, draft: &TenderDraft) {
    let today = Local::now().date_naive();
    let named = draft
        .works
        .iter()
        .flat_map(|work| work.bidders.iter())
        .filter_map(|bidder| {
            let name = bidder.name.as_deref()?.trim();
            (!name.is_empty()).then_some((name, bidder.address.as_deref()))
        });

    for (name, address) in named {
        if let Err(e) = directory.record_usage(name, address, today) {
            warn!(bidder = name, error = %e, "Could not update bidder usage");
        }
    }
}
