//! Chunked blob store, backed by the `blobs` and `blob_chunks` tables.
//!
//! Blob bodies are split into fixed-size chunk rows so a download can be
//! streamed chunk by chunk instead of holding the whole body in memory.
//! Deleting the blob row cascades to its chunks.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use hq_files::{
    content_digest, BlobByteStream, BlobId, BlobStorage, BlobUpload, StorageError, StorageResult,
    DEFAULT_CHUNK_SIZE,
};
use sqlx::PgPool;
use tracing::{debug, instrument};

fn backend_error(e: sqlx::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

/// Postgres-backed chunked blob storage
pub struct GridStore {
    pool: PgPool,
    chunk_size: usize,
}

impl GridStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the chunk size; exposed so tests can force multi-chunk
    /// bodies with small payloads.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

#[async_trait]
impl BlobStorage for GridStore {
    #[instrument(skip_all, fields(filename = %upload.filename, size = data.len()))]
    async fn put(&self, upload: BlobUpload, data: Bytes) -> StorageResult<BlobId> {
        let mut tx = self.pool.begin().await.map_err(backend_error)?;

        let blob_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO blobs (filename, content_type, length, chunk_size, digest,
                               category, zone, branch, file_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&upload.filename)
        .bind(&upload.content_type)
        .bind(data.len() as i64)
        .bind(self.chunk_size as i32)
        .bind(content_digest(&data))
        .bind(&upload.category)
        .bind(&upload.zone)
        .bind(&upload.branch)
        .bind(&upload.file_number)
        .fetch_one(&mut *tx)
        .await
        .map_err(backend_error)?;

        for (position, chunk) in data.chunks(self.chunk_size).enumerate() {
            sqlx::query("INSERT INTO blob_chunks (blob_id, position, data) VALUES ($1, $2, $3)")
                .bind(blob_id)
                .bind(position as i32)
                .bind(chunk)
                .execute(&mut *tx)
                .await
                .map_err(backend_error)?;
        }

        tx.commit().await.map_err(backend_error)?;

        debug!(blob_id, "Blob stored");
        Ok(blob_id)
    }

    async fn get(&self, id: BlobId) -> StorageResult<Bytes> {
        if !self.exists(id).await? {
            return Err(StorageError::NotFound(id));
        }

        let chunks = sqlx::query_scalar::<_, Vec<u8>>(
            "SELECT data FROM blob_chunks WHERE blob_id = $1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        Ok(Bytes::from(chunks.concat()))
    }

    async fn stream(&self, id: BlobId) -> StorageResult<BlobByteStream> {
        if !self.exists(id).await? {
            return Err(StorageError::NotFound(id));
        }

        let pool = self.pool.clone();
        let chunks = stream::try_unfold((pool, id, 0i32), |(pool, id, position)| async move {
            let chunk = sqlx::query_scalar::<_, Vec<u8>>(
                "SELECT data FROM blob_chunks WHERE blob_id = $1 AND position = $2",
            )
            .bind(id)
            .bind(position)
            .fetch_optional(&pool)
            .await
            .map_err(backend_error)?;

            Ok(chunk.map(|data| (Bytes::from(data), (pool, id, position + 1))))
        });

        Ok(chunks.boxed())
    }

    async fn delete(&self, id: BlobId) -> StorageResult<()> {
        // Chunk rows go with the blob row via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM blobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id));
        }

        debug!(blob_id = id, "Blob deleted");
        Ok(())
    }

    async fn exists(&self, id: BlobId) -> StorageResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM blobs WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(backend_error)
    }

    fn name(&self) -> &str {
        "grid"
    }
}
