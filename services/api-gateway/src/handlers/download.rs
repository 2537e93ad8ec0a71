use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::info;

use tendersheet_utils::{resolve_download_path, TenderError};

use crate::middleware::ApiError;
use crate::AppState;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// GET /download/:filename
///
/// Serves a file from the output root as an attachment.
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let path = resolve_download_path(&state.config.storage.output_dir, &filename)?;
    if !path.is_file() {
        return Err(TenderError::not_found(filename).into());
    }

    let bytes = tokio::fs::read(&path).await.map_err(TenderError::from)?;
    let content_type = match path.extension().and_then(|ext| ext.to_str()) {
        Some("zip") => "application/zip",
        Some("xlsx") => XLSX_MIME,
        _ => "application/octet-stream",
    };
    let attachment_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or(filename);

    info!(file = %attachment_name, bytes = bytes.len(), "Download served");

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", attachment_name),
            ),
        ],
        bytes,
    )
        .into_response())
}
