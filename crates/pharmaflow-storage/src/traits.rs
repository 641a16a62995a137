//! Storage abstraction trait
//!
//! This module defines the `ObjectStore` trait that all storage backends must
//! implement, plus the shared error and listing types.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::sse::SseKey;

/// Storage operation errors.
///
/// Service-side faults carry the HTTP status, the service error code, and the
/// request id for support escalation; client-side faults (dispatch, timeouts,
/// request construction) carry a message only.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{operation} service fault: status {status}, code {code:?}, request id {request_id:?}: {message}")]
    Service {
        operation: &'static str,
        status: u16,
        code: Option<String>,
        request_id: Option<String>,
        message: String,
    },

    #[error("{operation} client fault: {message}")]
    Client {
        operation: &'static str,
        message: String,
    },

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One object entry from a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
}

/// One page of a cursor-driven listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<ObjectSummary>,
    /// True when further pages remain; `next_token` resumes the listing.
    pub is_truncated: bool,
    pub next_token: Option<String>,
}

/// Options applied to an upload.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub content_type: Option<String>,
    /// Stored as the `title` metadata header.
    pub title: Option<String>,
    /// Stored as the `contact` metadata header.
    pub contact: Option<String>,
    /// Server-side encryption with a customer-provided key, when set.
    pub encryption: Option<SseKey>,
}

/// Storage abstraction trait
///
/// All storage backends (S3, in-memory) implement this trait so the batch
/// drivers can run against any backend without coupling to SDK details.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Make sure `bucket` exists: a no-op when it exists and is accessible,
    /// creation when absent. A name collision with a bucket owned by another
    /// account logs a warning and succeeds, so the caller can surface a
    /// clearer error on the first real operation against it.
    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<()>;

    /// Fetch one listing page, resuming from `token` when given.
    async fn list_page(&self, bucket: &str, token: Option<&str>) -> StorageResult<ListPage>;

    /// Download the full contents of one object.
    async fn download(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// Upload `body` to `bucket/key` with the given options.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        options: &UploadOptions,
    ) -> StorageResult<()>;

    /// Generate a time-limited GET URL for one object.
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;
}
