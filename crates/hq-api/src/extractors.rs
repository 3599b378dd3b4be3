//! Application state shared by API handlers.

use std::sync::Arc;

use hq_auth::SessionTokens;
use hq_db::{FileRepository, GridStore};
use hq_files::FileService;
use sqlx::PgPool;

use crate::error::{ApiError, ApiResult};

/// Concrete file service wired to the Postgres backends
pub type PgFileService = FileService<FileRepository, GridStore>;

/// Application state.
///
/// Constructed once at startup, after the database connection and the
/// attachment store exist; handlers never check readiness themselves.
/// The database and file service are optional only so router-level tests
/// can exercise validation paths without a live database.
#[derive(Clone)]
pub struct AppState {
    pool: Option<PgPool>,
    files: Option<Arc<PgFileService>>,
    pub tokens: Arc<SessionTokens>,
    /// Domain appended to usernames when deriving account emails
    pub mail_domain: String,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        files: Arc<PgFileService>,
        tokens: Arc<SessionTokens>,
        mail_domain: impl Into<String>,
    ) -> Self {
        Self {
            pool: Some(pool),
            files: Some(files),
            tokens,
            mail_domain: mail_domain.into(),
        }
    }

    /// State without storage backends, for handler tests that only reach
    /// validation and auth paths.
    pub fn detached(tokens: Arc<SessionTokens>, mail_domain: impl Into<String>) -> Self {
        Self {
            pool: None,
            files: None,
            tokens,
            mail_domain: mail_domain.into(),
        }
    }

    pub fn pool(&self) -> ApiResult<&PgPool> {
        self.pool
            .as_ref()
            .ok_or_else(|| ApiError::internal("Database not available"))
    }

    pub fn files(&self) -> ApiResult<&Arc<PgFileService>> {
        self.files
            .as_ref()
            .ok_or_else(|| ApiError::internal("File storage not available"))
    }
}
