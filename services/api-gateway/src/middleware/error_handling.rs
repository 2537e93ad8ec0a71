use axum::{
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use tendersheet_utils::{ErrorResponse, TenderError};
use tracing::{error, warn};

/// Handler error carrying the service's error taxonomy. The full error is
/// logged; the caller gets the short message.
#[derive(Debug)]
pub struct ApiError(pub TenderError);

impl From<TenderError> for ApiError {
    fn from(error: TenderError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self.0, code = self.0.error_code(), "Request failed");
        } else {
            warn!(error = %self.0, code = self.0.error_code(), "Request rejected");
        }

        let mut body = ErrorResponse::from(self.0);
        if status.is_server_error() {
            body.message = body.error.clone();
        }

        (status, Json(body)).into_response()
    }
}

/// Converts a panicked or cancelled blocking task into an internal error.
pub fn join_error(e: tokio::task::JoinError) -> ApiError {
    ApiError(TenderError::internal(format!("Background task failed: {}", e)))
}

pub async fn error_handling_middleware(
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;

    if response.status().is_server_error() {
        error!(%method, %uri, status = %response.status(), "Server error");
    }

    response
}
