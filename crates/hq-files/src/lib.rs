//! # hq-files
//!
//! The attachment store: binary uploads tagged with a (category, zone,
//! branch) partition key, numbered per partition, streamed into chunked
//! blob storage with a parallel searchable metadata index.
//!
//! ## Example
//!
//! ```rust,ignore
//! use hq_files::{FileService, FileScope, MemoryFileStore, MemoryBlobStorage};
//! use std::sync::Arc;
//!
//! let service = FileService::new(
//!     Arc::new(MemoryFileStore::new()),
//!     Arc::new(MemoryBlobStorage::new()),
//!     Default::default(),
//! );
//!
//! let scope = FileScope::new("licenses", "Zone A", "Headquarters");
//! let receipt = service
//!     .upload(&scope, "permit.pdf", Some("application/pdf"), bytes.into())
//!     .await?;
//! ```

pub mod model;
pub mod service;
pub mod storage;

pub use model::{format_file_number, FileRecord, FileScope};
pub use service::{
    AllowedFileTypes, FileError, FileResult, FileService, FileStore, MemoryFileStore,
    UploadReceipt,
};
pub use storage::{
    content_digest, BlobByteStream, BlobId, BlobStorage, BlobUpload, MemoryBlobStorage,
    StorageError, StorageResult, DEFAULT_CHUNK_SIZE,
};
