//! Blob storage abstraction.
//!
//! A blob object is an opaque chunked binary living outside the metadata
//! index, addressed by a `BlobId` that exactly one metadata record owns.
//! The production backend keeps blobs in PostgreSQL as fixed-size chunk
//! rows; `MemoryBlobStorage` backs the test suite.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::model::FileScope;

/// Opaque identifier of a stored blob object
pub type BlobId = i64;

/// Chunk size used when splitting blob bodies, in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 255 * 1024;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Blob not found: {0}")]
    NotFound(BlobId),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Byte stream of a blob body, yielded chunk by chunk
pub type BlobByteStream = BoxStream<'static, StorageResult<Bytes>>;

/// Descriptor written alongside a new blob object.
///
/// Carries the original filename, the declared MIME type, and the partition
/// side-fields so a blob remains identifiable even without its metadata
/// record.
#[derive(Debug, Clone)]
pub struct BlobUpload {
    pub filename: String,
    pub content_type: String,
    pub category: String,
    pub zone: String,
    pub branch: String,
    pub file_number: String,
}

impl BlobUpload {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        scope: &FileScope,
        file_number: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            category: scope.category.clone(),
            zone: scope.zone.clone(),
            branch: scope.branch.clone(),
            file_number: file_number.into(),
        }
    }
}

/// SHA-256 digest of a blob body, hex-encoded.
///
/// Recorded next to each stored blob so an orphaned object can still be
/// matched against a re-uploaded body.
pub fn content_digest(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Unified interface over blob storage backends
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store a blob body, returning the new blob's identifier.
    ///
    /// This is the durability-defining write of an upload: once it
    /// returns, the bytes are stored regardless of what happens to the
    /// metadata record afterwards.
    async fn put(&self, upload: BlobUpload, data: Bytes) -> StorageResult<BlobId>;

    /// Read a whole blob body into memory
    async fn get(&self, id: BlobId) -> StorageResult<Bytes>;

    /// Open the blob body as a chunk-by-chunk stream
    async fn stream(&self, id: BlobId) -> StorageResult<BlobByteStream>;

    /// Delete a blob object
    async fn delete(&self, id: BlobId) -> StorageResult<()>;

    /// Check whether a blob object exists
    async fn exists(&self, id: BlobId) -> StorageResult<bool>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// In-memory blob storage for testing
pub struct MemoryBlobStorage {
    blobs: RwLock<HashMap<BlobId, StoredBlob>>,
    next_id: AtomicI64,
}

struct StoredBlob {
    upload: BlobUpload,
    digest: String,
    data: Bytes,
}

impl Default for MemoryBlobStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored blob objects
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    /// Descriptor recorded with a stored blob
    pub async fn stored_upload(&self, id: BlobId) -> Option<BlobUpload> {
        self.blobs.read().await.get(&id).map(|b| b.upload.clone())
    }

    /// Digest recorded with a stored blob
    pub async fn stored_digest(&self, id: BlobId) -> Option<String> {
        self.blobs.read().await.get(&id).map(|b| b.digest.clone())
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn put(&self, upload: BlobUpload, data: Bytes) -> StorageResult<BlobId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let digest = content_digest(&data);

        let mut blobs = self.blobs.write().await;
        blobs.insert(
            id,
            StoredBlob {
                upload,
                digest,
                data,
            },
        );
        Ok(id)
    }

    async fn get(&self, id: BlobId) -> StorageResult<Bytes> {
        let blobs = self.blobs.read().await;
        blobs
            .get(&id)
            .map(|b| b.data.clone())
            .ok_or(StorageError::NotFound(id))
    }

    async fn stream(&self, id: BlobId) -> StorageResult<BlobByteStream> {
        let data = self.get(id).await?;
        let chunks: Vec<Bytes> = data
            .chunks(DEFAULT_CHUNK_SIZE)
            .map(Bytes::copy_from_slice)
            .collect();
        Ok(stream::iter(chunks.into_iter().map(Ok::<_, StorageError>)).boxed())
    }

    async fn delete(&self, id: BlobId) -> StorageResult<()> {
        let mut blobs = self.blobs.write().await;
        blobs
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound(id))
    }

    async fn exists(&self, id: BlobId) -> StorageResult<bool> {
        let blobs = self.blobs.read().await;
        Ok(blobs.contains_key(&id))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    fn upload(scope: &FileScope) -> BlobUpload {
        BlobUpload::new("test.txt", "text/plain", scope, "00001")
    }

    #[tokio::test]
    async fn test_put_get() {
        let storage = MemoryBlobStorage::new();
        let scope = FileScope::new("docs", "Zone A", "Headquarters");
        let data = Bytes::from("hello blob");

        let id = storage.put(upload(&scope), data.clone()).await.unwrap();
        assert_eq!(storage.get(id).await.unwrap(), data);
        assert!(storage.exists(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let storage = MemoryBlobStorage::new();
        let scope = FileScope::new("docs", "Zone A", "Headquarters");

        let id = storage.put(upload(&scope), Bytes::from("x")).await.unwrap();
        storage.delete(id).await.unwrap();

        assert!(!storage.exists(id).await.unwrap());
        assert!(matches!(
            storage.get(id).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_blob() {
        let storage = MemoryBlobStorage::new();
        assert!(matches!(
            storage.delete(99).await,
            Err(StorageError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_put_records_side_fields_and_digest() {
        let storage = MemoryBlobStorage::new();
        let scope = FileScope::new("licenses", "Zone B", "F-10");
        let data = Bytes::from("digest me");

        let id = storage
            .put(
                BlobUpload::new("permit.pdf", "application/pdf", &scope, "00003"),
                data.clone(),
            )
            .await
            .unwrap();

        let stored = storage.stored_upload(id).await.unwrap();
        assert_eq!(stored.zone, "Zone B");
        assert_eq!(stored.branch, "F-10");
        assert_eq!(stored.file_number, "00003");

        assert_eq!(storage.stored_digest(id).await.unwrap(), content_digest(&data));
    }

    #[test]
    fn test_content_digest_is_hex_sha256() {
        let digest = content_digest(b"hello");
        assert_eq!(digest.len(), 64);
        assert_eq!(
            digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn test_stream_reassembles_body() {
        let storage = MemoryBlobStorage::new();
        let scope = FileScope::new("docs", "Zone A", "Headquarters");

        // Larger than one chunk so the stream yields more than one item
        let data = Bytes::from(vec![7u8; DEFAULT_CHUNK_SIZE + 100]);
        let id = storage.put(upload(&scope), data.clone()).await.unwrap();

        let chunks: Vec<Bytes> = storage.stream(id).await.unwrap().try_collect().await.unwrap();
        assert!(chunks.len() > 1);

        let reassembled: Vec<u8> = chunks.concat();
        assert_eq!(Bytes::from(reassembled), data);
    }
}
