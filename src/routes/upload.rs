//! Book upload endpoint
//!
//! Accepts a multipart upload, runs the processing pipeline, and returns
//! the full page set as JSON.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};

use crate::error::AppError;
use crate::reader::{process_book, RenderPayload};
use crate::state::AppState;

/// Create the upload router
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(upload_book))
        .layer(DefaultBodyLimit::max(state.config().reader.max_upload_bytes))
}

/// Upload a book and get back the rendered pages
async fn upload_book(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RenderPayload>, AppError> {
    tracing::debug!("Starting book upload processing");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        let filename = field.file_name().map(|s| s.to_string());

        tracing::debug!("Received field: name='{}', filename={:?}", name, filename);

        if name == "file" || name == "epub" || name == "epub_file" {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?;

            tracing::debug!("Read {} bytes of file data", data.len());

            let max_page_chars = state.config().reader.max_page_chars;
            let payload = tokio::task::spawn_blocking(move || {
                process_book(&data, max_page_chars)
            })
            .await
            .map_err(|e| AppError::Internal(format!("Processing task failed: {}", e)))??;

            return Ok(Json(payload));
        }
    }

    tracing::warn!("No file field found in multipart upload");
    Err(AppError::BadRequest(
        "No file provided. Use field name 'file' or 'epub'".to_string(),
    ))
}
