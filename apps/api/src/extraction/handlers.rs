//! Axum route handlers for the Extraction API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::upload::{read_upload_as_text, UploadText};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// POST /api/v1/extract
///
/// Accepts `multipart/form-data` with a `file` field and returns its text.
/// Extraction itself never fails; an unreadable PDF comes back with
/// `readable: false` and a warning instead of an error status.
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadText>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let upload_id = Uuid::new_v4();
        let span = info_span!("upload", %upload_id, file_name = %file_name);
        let upload = read_upload_as_text(&state.extractor, &file_name, bytes)
            .instrument(span)
            .await;
        return Ok(Json(upload));
    }

    Err(AppError::Validation(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(e.body_text())
    }
}
