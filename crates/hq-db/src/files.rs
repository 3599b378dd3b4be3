//! File metadata index, backed by the `files` table.
//!
//! Implements the `hq-files` metadata store trait; one row per uploaded
//! file, scoped by the (category, zone, branch) partition key.

use async_trait::async_trait;
use hq_core::types::Id;
use hq_files::{FileError, FileRecord, FileResult, FileScope, FileStore};
use sqlx::{FromRow, PgPool};

/// Row shape of the `files` table
#[derive(Debug, Clone, FromRow)]
struct FileRow {
    id: i64,
    filename: String,
    filetype: String,
    last_modified: String,
    file_id: i64,
    category: String,
    file_number: String,
    zone: String,
    branch: String,
}

impl From<FileRow> for FileRecord {
    fn from(row: FileRow) -> Self {
        FileRecord {
            id: Some(row.id),
            filename: row.filename,
            filetype: row.filetype,
            last_modified: row.last_modified,
            file_id: row.file_id,
            category: row.category,
            file_number: row.file_number,
            zone: row.zone,
            branch: row.branch,
        }
    }
}

fn store_error(e: sqlx::Error) -> FileError {
    FileError::Store(e.to_string())
}

const FILE_COLUMNS: &str =
    "id, filename, filetype, last_modified, file_id, category, file_number, zone, branch";

/// Postgres-backed file metadata store
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn count(&self, scope: &FileScope) -> FileResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM files WHERE category = $1 AND zone = $2 AND branch = $3",
        )
        .bind(&scope.category)
        .bind(&scope.zone)
        .bind(&scope.branch)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)
    }

    async fn insert(&self, record: &FileRecord) -> FileResult<Id> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO files (filename, filetype, last_modified, file_id,
                               category, file_number, zone, branch)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&record.filename)
        .bind(&record.filetype)
        .bind(&record.last_modified)
        .bind(record.file_id)
        .bind(&record.category)
        .bind(&record.file_number)
        .bind(&record.zone)
        .bind(&record.branch)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)
    }

    async fn list(&self, scope: &FileScope) -> FileResult<Vec<FileRecord>> {
        let rows = sqlx::query_as::<_, FileRow>(&format!(
            "SELECT {FILE_COLUMNS} FROM files \
             WHERE category = $1 AND zone = $2 AND branch = $3 ORDER BY id"
        ))
        .bind(&scope.category)
        .bind(&scope.zone)
        .bind(&scope.branch)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(FileRecord::from).collect())
    }

    async fn find_by_filename(&self, filename: &str) -> FileResult<Option<FileRecord>> {
        let row = sqlx::query_as::<_, FileRow>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE filename = $1 ORDER BY id LIMIT 1"
        ))
        .bind(filename)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(FileRecord::from))
    }

    async fn find_in_scope(
        &self,
        scope: &FileScope,
        filename: &str,
    ) -> FileResult<Option<FileRecord>> {
        let row = sqlx::query_as::<_, FileRow>(&format!(
            "SELECT {FILE_COLUMNS} FROM files \
             WHERE filename = $1 AND category = $2 AND zone = $3 AND branch = $4 \
             ORDER BY id LIMIT 1"
        ))
        .bind(filename)
        .bind(&scope.category)
        .bind(&scope.zone)
        .bind(&scope.branch)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(FileRecord::from))
    }

    async fn delete(&self, id: Id) -> FileResult<u64> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected())
    }
}
