//! File service.
//!
//! Orchestrates uploads, downloads, deletes, and partition listing over a
//! metadata store and a blob storage backend. The service holds no state of
//! its own beyond the outstanding-write counter; all durable state lives in
//! the two backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use hq_core::types::Id;
use thiserror::Error;
use tokio::sync::{Notify, RwLock};
use tracing::{debug, error, info, instrument};

use crate::model::{format_file_number, FileRecord, FileScope};
use crate::storage::{BlobByteStream, BlobId, BlobStorage, BlobUpload, StorageError};

/// Service errors
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),
    #[error("File not found")]
    NotFound,
    #[error("Failed to delete file metadata")]
    MetadataDeleteFailed,
    #[error("Failed to delete file data: {0}")]
    BlobDeleteFailed(StorageError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Metadata store error: {0}")]
    Store(String),
}

pub type FileResult<T> = Result<T, FileError>;

/// Metadata index over file records
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Count records in a partition
    async fn count(&self, scope: &FileScope) -> FileResult<i64>;

    /// Persist a record, returning its id
    async fn insert(&self, record: &FileRecord) -> FileResult<Id>;

    /// All records in a partition
    async fn list(&self, scope: &FileScope) -> FileResult<Vec<FileRecord>>;

    /// First record matching a filename, regardless of partition
    async fn find_by_filename(&self, filename: &str) -> FileResult<Option<FileRecord>>;

    /// Record matching a filename within a partition
    async fn find_in_scope(&self, scope: &FileScope, filename: &str)
        -> FileResult<Option<FileRecord>>;

    /// Delete a record by id, returning the number of rows removed
    async fn delete(&self, id: Id) -> FileResult<u64>;
}

/// In-memory metadata store for testing
pub struct MemoryFileStore {
    records: RwLock<Vec<FileRecord>>,
    next_id: std::sync::atomic::AtomicI64,
}

impl Default for MemoryFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: std::sync::atomic::AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn count(&self, scope: &FileScope) -> FileResult<i64> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| r.in_scope(scope)).count() as i64)
    }

    async fn insert(&self, record: &FileRecord) -> FileResult<Id> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut stored = record.clone();
        stored.id = Some(id);

        let mut records = self.records.write().await;
        records.push(stored);
        Ok(id)
    }

    async fn list(&self, scope: &FileScope) -> FileResult<Vec<FileRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| r.in_scope(scope)).cloned().collect())
    }

    async fn find_by_filename(&self, filename: &str) -> FileResult<Option<FileRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.filename == filename).cloned())
    }

    async fn find_in_scope(
        &self,
        scope: &FileScope,
        filename: &str,
    ) -> FileResult<Option<FileRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.in_scope(scope) && r.filename == filename)
            .cloned())
    }

    async fn delete(&self, id: Id) -> FileResult<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != Some(id));
        Ok((before - records.len()) as u64)
    }
}

/// MIME allow-set for uploads
#[derive(Debug, Clone)]
pub struct AllowedFileTypes {
    pub mime_types: Vec<String>,
}

impl Default for AllowedFileTypes {
    fn default() -> Self {
        Self {
            mime_types: vec![
                "image/png".to_string(),
                "image/jpeg".to_string(),
                "image/webp".to_string(),
                "application/pdf".to_string(),
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                    .to_string(),
                "application/vnd.ms-excel".to_string(),
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
                "text/csv".to_string(),
                "application/txt".to_string(),
            ],
        }
    }
}

impl AllowedFileTypes {
    pub fn is_allowed(&self, content_type: &str) -> bool {
        self.mime_types.iter().any(|t| t == content_type)
    }
}

/// Receipt returned to the caller once the blob write has finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub file_id: BlobId,
    pub file_number: String,
}

/// File service over a metadata store and a blob storage backend.
///
/// Constructed explicitly from already-established backends; the HTTP
/// surface is not started until this exists, so there is no per-request
/// readiness checking.
pub struct FileService<St: FileStore, S: BlobStorage> {
    store: Arc<St>,
    storage: Arc<S>,
    allowed: AllowedFileTypes,
    pending_writes: Arc<AtomicUsize>,
    write_settled: Arc<Notify>,
}

impl<St: FileStore + 'static, S: BlobStorage> FileService<St, S> {
    pub fn new(store: Arc<St>, storage: Arc<S>, allowed: AllowedFileTypes) -> Self {
        Self {
            store,
            storage,
            allowed,
            pending_writes: Arc::new(AtomicUsize::new(0)),
            write_settled: Arc::new(Notify::new()),
        }
    }

    /// Next file number for a partition: current record count plus one,
    /// zero-padded to five digits.
    ///
    /// Read-then-derive with no uniqueness guarantee: two concurrent
    /// uploads to the same partition can observe the same count and both
    /// receive the same number.
    pub async fn next_file_number(&self, scope: &FileScope) -> FileResult<String> {
        let count = self.store.count(scope).await?;
        Ok(format_file_number(count + 1))
    }

    /// Upload a file into a partition.
    ///
    /// The MIME allow-set is checked before anything is written. The blob
    /// write is the durability-defining step; the metadata write is
    /// detached from the response path and tracked only by the
    /// outstanding-write counter, so a metadata failure after a successful
    /// blob write leaves an orphaned blob.
    #[instrument(skip_all, fields(scope = %scope, filename = filename))]
    pub async fn upload(
        &self,
        scope: &FileScope,
        filename: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> FileResult<UploadReceipt> {
        let content_type = match content_type {
            Some(ct) => ct.to_string(),
            None => mime_guess::from_path(filename)
                .first_or_octet_stream()
                .to_string(),
        };

        if !self.allowed.is_allowed(&content_type) {
            return Err(FileError::InvalidFileType(content_type));
        }

        let filename = filename.trim().to_string();
        let file_number = self.next_file_number(scope).await?;

        let blob_id = self
            .storage
            .put(
                BlobUpload::new(&filename, &content_type, scope, &file_number),
                data,
            )
            .await?;

        info!(blob_id, file_number = %file_number, "File stored");

        let record = FileRecord::new(&filename, &content_type, blob_id, scope, &file_number);

        self.pending_writes.fetch_add(1, Ordering::SeqCst);
        let store = Arc::clone(&self.store);
        let pending = Arc::clone(&self.pending_writes);
        let settled = Arc::clone(&self.write_settled);
        tokio::spawn(async move {
            if let Err(e) = store.insert(&record).await {
                error!(filename = %record.filename, error = %e, "Failed to save file metadata");
            }
            pending.fetch_sub(1, Ordering::SeqCst);
            settled.notify_one();
        });

        Ok(UploadReceipt {
            file_id: blob_id,
            file_number,
        })
    }

    /// Number of metadata writes still outstanding
    pub fn pending_metadata_writes(&self) -> usize {
        self.pending_writes.load(Ordering::SeqCst)
    }

    /// Wait until every detached metadata write has settled
    pub async fn wait_for_metadata_writes(&self) {
        while self.pending_writes.load(Ordering::SeqCst) > 0 {
            self.write_settled.notified().await;
        }
    }

    /// All metadata records in a partition.
    ///
    /// An empty partition is reported as `NotFound`, not as an empty list.
    pub async fn list(&self, scope: &FileScope) -> FileResult<Vec<FileRecord>> {
        let records = self.store.list(scope).await?;
        if records.is_empty() {
            return Err(FileError::NotFound);
        }
        Ok(records)
    }

    /// Open a file for download by exact filename.
    ///
    /// Filename is not a unique key; the first matching record wins when
    /// duplicates exist across partitions.
    #[instrument(skip(self))]
    pub async fn download(&self, filename: &str) -> FileResult<(FileRecord, BlobByteStream)> {
        let record = self
            .store
            .find_by_filename(filename)
            .await?
            .ok_or(FileError::NotFound)?;

        let stream = self.storage.stream(record.file_id).await?;
        debug!(blob_id = record.file_id, "File download stream opened");

        Ok((record, stream))
    }

    /// Delete a file by partition and filename.
    ///
    /// The metadata record is removed first; only after that succeeds is
    /// the blob deleted. A blob-delete failure therefore leaves an
    /// orphaned blob with no metadata record.
    #[instrument(skip_all, fields(scope = %scope, filename = filename))]
    pub async fn delete(&self, scope: &FileScope, filename: &str) -> FileResult<()> {
        let record = self
            .store
            .find_in_scope(scope, filename)
            .await?
            .ok_or(FileError::NotFound)?;

        let record_id = record.id.ok_or_else(|| {
            FileError::Store("metadata record has no id".to_string())
        })?;

        let removed = self.store.delete(record_id).await?;
        if removed == 0 {
            return Err(FileError::MetadataDeleteFailed);
        }

        self.storage
            .delete(record.file_id)
            .await
            .map_err(FileError::BlobDeleteFailed)?;

        info!(filename = %record.filename, blob_id = record.file_id, "File deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStorage;
    use futures::TryStreamExt;

    fn create_service() -> FileService<MemoryFileStore, MemoryBlobStorage> {
        FileService::new(
            Arc::new(MemoryFileStore::new()),
            Arc::new(MemoryBlobStorage::new()),
            AllowedFileTypes::default(),
        )
    }

    fn scope() -> FileScope {
        FileScope::new("licenses", "Zone A", "Headquarters")
    }

    async fn collect(stream: BlobByteStream) -> Bytes {
        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
        Bytes::from(chunks.concat())
    }

    #[tokio::test]
    async fn test_first_upload_gets_number_one() {
        let service = create_service();

        let receipt = service
            .upload(&scope(), "permit.pdf", Some("application/pdf"), Bytes::from("pdf"))
            .await
            .unwrap();

        assert_eq!(receipt.file_number, "00001");
    }

    #[tokio::test]
    async fn test_sequential_uploads_number_in_order() {
        let service = create_service();

        for n in 1..=12 {
            let receipt = service
                .upload(
                    &scope(),
                    &format!("file{}.csv", n),
                    Some("text/csv"),
                    Bytes::from("a,b"),
                )
                .await
                .unwrap();
            // Settle the metadata write so the next count sees this record
            service.wait_for_metadata_writes().await;

            assert_eq!(receipt.file_number, format_file_number(n));
        }
    }

    #[tokio::test]
    async fn test_numbering_is_scoped_per_partition() {
        let service = create_service();
        let other = FileScope::new("licenses", "Zone A", "I-8");

        let a = service
            .upload(&scope(), "a.csv", Some("text/csv"), Bytes::from("a"))
            .await
            .unwrap();
        service.wait_for_metadata_writes().await;

        let b = service
            .upload(&other, "b.csv", Some("text/csv"), Bytes::from("b"))
            .await
            .unwrap();
        service.wait_for_metadata_writes().await;

        assert_eq!(a.file_number, "00001");
        assert_eq!(b.file_number, "00001");
    }

    #[tokio::test]
    async fn test_rejected_mime_type_writes_nothing() {
        let store = Arc::new(MemoryFileStore::new());
        let storage = Arc::new(MemoryBlobStorage::new());
        let service = FileService::new(
            Arc::clone(&store),
            Arc::clone(&storage),
            AllowedFileTypes::default(),
        );

        let result = service
            .upload(
                &scope(),
                "payload.exe",
                Some("application/x-msdownload"),
                Bytes::from("MZ"),
            )
            .await;

        assert!(matches!(result, Err(FileError::InvalidFileType(_))));
        service.wait_for_metadata_writes().await;
        assert!(storage.is_empty().await);
        assert!(store.find_by_filename("payload.exe").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_content_type_guessed_from_filename() {
        let service = create_service();

        // No declared type: guessed from the extension, then checked
        // against the allow-set like any declared type.
        let ok = service
            .upload(&scope(), "photo.png", None, Bytes::from("png"))
            .await;
        assert!(ok.is_ok());

        let rejected = service
            .upload(&scope(), "page.html", None, Bytes::from("<html>"))
            .await;
        assert!(matches!(rejected, Err(FileError::InvalidFileType(_))));
    }

    #[tokio::test]
    async fn test_filename_is_trimmed() {
        let service = create_service();

        service
            .upload(&scope(), "  spaced.csv  ", Some("text/csv"), Bytes::from("x"))
            .await
            .unwrap();
        service.wait_for_metadata_writes().await;

        let (record, _) = service.download("spaced.csv").await.unwrap();
        assert_eq!(record.filename, "spaced.csv");
    }

    #[tokio::test]
    async fn test_download_roundtrip() {
        let service = create_service();
        let body = Bytes::from(vec![42u8; 300 * 1024]);

        service
            .upload(&scope(), "big.pdf", Some("application/pdf"), body.clone())
            .await
            .unwrap();
        service.wait_for_metadata_writes().await;

        let (record, stream) = service.download("big.pdf").await.unwrap();
        assert_eq!(record.filetype, "application/pdf");
        assert_eq!(collect(stream).await, body);
    }

    #[tokio::test]
    async fn test_download_unknown_filename() {
        let service = create_service();
        assert!(matches!(
            service.download("missing.pdf").await,
            Err(FileError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_unknown_file_touches_no_blob() {
        let store = Arc::new(MemoryFileStore::new());
        let storage = Arc::new(MemoryBlobStorage::new());
        let service = FileService::new(
            Arc::clone(&store),
            Arc::clone(&storage),
            AllowedFileTypes::default(),
        );

        service
            .upload(&scope(), "keep.csv", Some("text/csv"), Bytes::from("x"))
            .await
            .unwrap();
        service.wait_for_metadata_writes().await;

        let result = service.delete(&scope(), "other.csv").await;
        assert!(matches!(result, Err(FileError::NotFound)));
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_removes_metadata_and_blob() {
        let store = Arc::new(MemoryFileStore::new());
        let storage = Arc::new(MemoryBlobStorage::new());
        let service = FileService::new(
            Arc::clone(&store),
            Arc::clone(&storage),
            AllowedFileTypes::default(),
        );

        let receipt = service
            .upload(&scope(), "gone.csv", Some("text/csv"), Bytes::from("x"))
            .await
            .unwrap();
        service.wait_for_metadata_writes().await;

        service.delete(&scope(), "gone.csv").await.unwrap();

        assert!(!storage.exists(receipt.file_id).await.unwrap());
        assert!(matches!(service.list(&scope()).await, Err(FileError::NotFound)));
        assert!(matches!(
            service.download("gone.csv").await,
            Err(FileError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_is_scoped() {
        let service = create_service();
        let other = FileScope::new("licenses", "Zone B", "F-10");

        service
            .upload(&scope(), "shared.csv", Some("text/csv"), Bytes::from("x"))
            .await
            .unwrap();
        service.wait_for_metadata_writes().await;

        // Same filename, wrong partition: no match
        let result = service.delete(&other, "shared.csv").await;
        assert!(matches!(result, Err(FileError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_empty_partition_is_not_found() {
        let service = create_service();
        assert!(matches!(service.list(&scope()).await, Err(FileError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_returns_partition_records_only() {
        let service = create_service();
        let other = FileScope::new("menus", "Zone A", "Headquarters");

        service
            .upload(&scope(), "a.csv", Some("text/csv"), Bytes::from("a"))
            .await
            .unwrap();
        service
            .upload(&other, "b.csv", Some("text/csv"), Bytes::from("b"))
            .await
            .unwrap();
        service.wait_for_metadata_writes().await;

        let records = service.list(&scope()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "a.csv");
    }

    #[tokio::test]
    async fn test_concurrent_number_derivation_collides() {
        // The numbering step is read-then-derive: two derivations against
        // the same empty partition both observe count 0 and both produce
        // "00001". This demonstrates the documented race rather than
        // asserting uniqueness.
        let service = create_service();

        let scope_a = scope();
        let scope_b = scope();
        let (a, b) = tokio::join!(
            service.next_file_number(&scope_a),
            service.next_file_number(&scope_b)
        );

        assert_eq!(a.unwrap(), "00001");
        assert_eq!(b.unwrap(), "00001");
    }

    #[tokio::test]
    async fn test_concurrent_uploads_can_share_a_number() {
        let service = create_service();

        let scope_a = scope();
        let scope_b = scope();
        let (a, b) = tokio::join!(
            service.upload(&scope_a, "one.csv", Some("text/csv"), Bytes::from("1")),
            service.upload(&scope_b, "two.csv", Some("text/csv"), Bytes::from("2"))
        );
        service.wait_for_metadata_writes().await;

        // Neither upload's metadata write had landed when the other read
        // the partition count.
        assert_eq!(a.unwrap().file_number, "00001");
        assert_eq!(b.unwrap().file_number, "00001");
    }

    #[tokio::test]
    async fn test_pending_writes_settle_to_zero() {
        let service = create_service();

        service
            .upload(&scope(), "x.csv", Some("text/csv"), Bytes::from("x"))
            .await
            .unwrap();

        service.wait_for_metadata_writes().await;
        assert_eq!(service.pending_metadata_writes(), 0);

        let records = service.list(&scope()).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_allow_set_is_exact() {
        let allowed = AllowedFileTypes::default();

        assert!(allowed.is_allowed("image/png"));
        assert!(allowed.is_allowed("text/csv"));
        assert!(allowed.is_allowed("application/txt"));
        // Plain text is spelled "application/txt" in the allow-set;
        // "text/plain" is not in it.
        assert!(!allowed.is_allowed("text/plain"));
        assert!(!allowed.is_allowed("application/zip"));
        assert!(!allowed.is_allowed("image/gif"));
    }
}
