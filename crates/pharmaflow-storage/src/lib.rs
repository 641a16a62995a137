//! Pharmaflow storage library
//!
//! Object-storage abstraction for the batch tools. The `ObjectStore` trait
//! covers the small surface the drivers need (bucket ensure, cursor-paged
//! listing, download, upload with optional SSE-C, presigned GET URLs) with an
//! S3 backend and an in-memory backend for tests and offline runs.

pub mod memory;
pub mod s3;
pub mod sse;
pub mod traits;

// Re-export commonly used types
pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;
pub use sse::SseKey;
pub use traits::{
    ListPage, ObjectStore, ObjectSummary, StorageError, StorageResult, UploadOptions,
};
