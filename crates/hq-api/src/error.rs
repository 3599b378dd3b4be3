//! API error handling.
//!
//! Every failure is rendered as an HTTP status with a JSON `{"message"}`
//! body; nothing beyond the status carries a machine-readable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hq_db::RepositoryError;
use hq_files::FileError;
use serde::Serialize;
use tracing::error;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::NotFound(m)
            | ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::Conflict(m)
            | ApiError::Internal(m) => m,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            message: self.message().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(msg) => ApiError::NotFound(msg),
            RepositoryError::Validation(msg) => ApiError::BadRequest(msg),
            RepositoryError::Conflict(msg) => ApiError::Conflict(msg),
            RepositoryError::Database(err) => {
                error!(error = %err, "Database error");
                ApiError::Internal("Server error".to_string())
            }
        }
    }
}

impl From<FileError> for ApiError {
    fn from(e: FileError) -> Self {
        match e {
            FileError::InvalidFileType(_) => ApiError::BadRequest(
                "Invalid file type! Only PNG, JPEG, WebP, PDF, DOCX, XLS, XLSX, and CSV files \
                 are allowed."
                    .to_string(),
            ),
            FileError::NotFound => ApiError::NotFound("File not found".to_string()),
            FileError::MetadataDeleteFailed => {
                ApiError::Internal("Failed to delete file metadata".to_string())
            }
            FileError::BlobDeleteFailed(err) => {
                error!(error = %err, "Blob deletion failed after metadata removal");
                ApiError::Internal("Failed to delete file data".to_string())
            }
            FileError::Storage(err) => {
                error!(error = %err, "Storage error");
                ApiError::Internal("Server error".to_string())
            }
            FileError::Store(err) => {
                error!(error = %err, "Metadata store error");
                ApiError::Internal("Server error".to_string())
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_file_error_mapping() {
        let rejected: ApiError = FileError::InvalidFileType("application/zip".into()).into();
        assert_eq!(rejected.status_code(), StatusCode::BAD_REQUEST);

        let missing: ApiError = FileError::NotFound.into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let partial: ApiError = FileError::MetadataDeleteFailed.into();
        assert_eq!(partial.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_repository_error_hides_database_detail() {
        let e: ApiError =
            RepositoryError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.message(), "Server error");
    }
}
