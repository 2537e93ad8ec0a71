//! Upload Handler
//!
//! Receives a tender sheet, stores it under the upload dir and parses it
//! through the shared parse cache.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    response::Json,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use tendersheet_models::TenderRecord;
use tendersheet_utils::{
    sanitize_filename, task_id_for_path, validate_file_type, TenderError, TenderResult,
};

use crate::middleware::{join_error, ApiError};
use crate::AppState;

const UPLOAD_FIELD: &str = "file";
const UNKNOWN_FILE_TYPE: &str = "unknown";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub data: TenderRecord,
    pub processing_time: f64,
    pub task_id: String,
}

/// POST /upload
///
/// Every attempt is counted in analytics, including ones rejected before
/// parsing.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let started = Instant::now();
    let mut file_type = UNKNOWN_FILE_TYPE.to_string();

    let outcome = process_upload(&state, multipart, &mut file_type).await;
    let processing_time = started.elapsed().as_secs_f64();

    record_upload_event(&state, file_type, outcome.is_ok(), processing_time).await;

    let (record, path) = outcome?;
    info!(
        file = %path.display(),
        works = record.works.len(),
        processing_time,
        "Upload processed"
    );

    Ok(Json(UploadResponse {
        success: true,
        data: record,
        processing_time,
        task_id: task_id_for_path(&path),
    }))
}

/// Sets `file_type` as soon as the client's file name is known so rejected
/// uploads are attributed to the type they claimed.
async fn process_upload(
    state: &AppState,
    multipart: Multipart,
    file_type: &mut String,
) -> Result<(TenderRecord, PathBuf), ApiError> {
    let (file_name, data) = read_upload(multipart).await?;
    *file_type = extension_of(&file_name);
    check_upload(state, &file_name, data.len() as u64)?;

    let safe_name = sanitize_filename(&file_name);
    if safe_name.is_empty() {
        return Err(TenderError::input("No file selected").into());
    }
    let path = state.config.storage.upload_dir.join(&safe_name);

    let record = save_and_parse(state, &path, &data).await?;
    Ok((record, path))
}

/// The analytics file is rewritten on every event, so the write runs on the
/// blocking pool.
async fn record_upload_event(state: &AppState, file_type: String, success: bool, processing_time: f64) {
    let tracking = state.tracking.clone();
    let recorded = tokio::task::spawn_blocking(move || {
        tracking.record_event(&file_type, success, Some(processing_time));
    })
    .await;
    if let Err(e) = recorded {
        warn!(error = %e, "Analytics update did not finish");
    }
    state.metrics.record_upload(success);
}

async fn read_upload(mut multipart: Multipart) -> TenderResult<(String, Bytes)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| TenderError::input(format!("Failed to read upload: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| TenderError::input(format!("Failed to read file data: {}", e)))?;
        return Ok((file_name, data));
    }

    Err(TenderError::input("No file provided"))
}

fn check_upload(state: &AppState, file_name: &str, size: u64) -> TenderResult<()> {
    if file_name.trim().is_empty() {
        return Err(TenderError::input("No file selected"));
    }

    let parser_config = &state.config.parser;
    validate_file_type(file_name, &parser_config.allowed_extensions)?;

    if size > parser_config.max_file_size {
        return Err(TenderError::input(format!(
            "File too large. Maximum size is {}MB",
            parser_config.max_file_size_mb()
        )));
    }

    Ok(())
}

async fn save_and_parse(state: &AppState, path: &Path, data: &[u8]) -> Result<TenderRecord, ApiError> {
    tokio::fs::write(path, data)
        .await
        .map_err(|e| TenderError::internal(format!("Failed to save upload: {}", e)))?;

    let cache = state.cache.clone();
    let parser = state.parser.clone();
    let path: PathBuf = path.to_path_buf();

    let record = tokio::task::spawn_blocking(move || cache.get_or_parse(&path, &parser))
        .await
        .map_err(join_error)??;
    Ok(record)
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| UNKNOWN_FILE_TYPE.to_string())
}
