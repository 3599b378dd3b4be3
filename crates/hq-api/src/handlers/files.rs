//! File upload, download, listing, and deletion handlers.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use hq_files::{FileError, FileScope};
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extractors::AppState;
use crate::handlers::Message;

/// List all files in a partition
///
/// GET /api/files/:category/:zone/:branch
pub async fn list_files(
    State(state): State<AppState>,
    Path((category, zone, branch)): Path<(String, String, String)>,
) -> ApiResult<impl IntoResponse> {
    let scope = FileScope::new(category, zone, branch);

    let records = state.files()?.list(&scope).await.map_err(|e| match e {
        FileError::NotFound => {
            ApiError::not_found("No files found for this category, zone, and branch.")
        }
        other => other.into(),
    })?;

    Ok(Json(records))
}

/// Upload a file into a partition
///
/// POST /api/files/:category/:zone/:branch
pub async fn upload_file(
    State(state): State<AppState>,
    Path((category, zone, branch)): Path<(String, String, String)>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let scope = FileScope::new(category, zone, branch);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("File name is required"))?;
        let content_type = field.content_type().map(str::to_string);

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload body: {e}")))?;

        let receipt = state
            .files()?
            .upload(&scope, &filename, content_type.as_deref(), data)
            .await?;

        info!(filename = %filename, file_id = receipt.file_id, "File uploaded");

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                message: "File uploaded successfully".into(),
                file_id: receipt.file_id,
            }),
        ));
    }

    Err(ApiError::bad_request("File is required"))
}

/// Download a file by filename
///
/// GET /api/files/download/:filename
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let (record, stream) = state.files()?.download(&filename).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, record.filetype)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", record.filename),
        )
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(response)
}

/// Delete a file by partition and filename
///
/// DELETE /api/files/:category/:zone/:branch/:filename
pub async fn delete_file(
    State(state): State<AppState>,
    Path((category, zone, branch, filename)): Path<(String, String, String, String)>,
) -> ApiResult<impl IntoResponse> {
    let scope = FileScope::new(category, zone, branch);

    state
        .files()?
        .delete(&scope, filename.trim())
        .await?;

    Ok(Json(Message::new("File deleted successfully")))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub file_id: i64,
}
