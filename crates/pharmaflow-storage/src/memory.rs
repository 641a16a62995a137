//! In-memory storage backend.
//!
//! Backs the service-layer tests and offline runs with the same trait surface
//! as the S3 backend. Listing is paged with a marker-style cursor (the last
//! key of the previous page) so pagination-driven callers behave exactly as
//! they do against the real service.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::traits::{
    ListPage, ObjectStore, ObjectSummary, StorageError, StorageResult, UploadOptions,
};

const DEFAULT_PAGE_SIZE: usize = 1000;

type Bucket = BTreeMap<String, Vec<u8>>;

/// Map-backed `ObjectStore` with a configurable listing page size.
///
/// Uploads store plaintext; encryption options are accepted and ignored.
pub struct MemoryObjectStore {
    buckets: Mutex<BTreeMap<String, Bucket>>,
    page_size: usize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// A small page size forces multi-page listings in tests.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            buckets: Mutex::new(BTreeMap::new()),
            page_size: page_size.max(1),
        }
    }

    /// Number of objects currently stored in `bucket`.
    pub fn object_count(&self, bucket: &str) -> usize {
        self.buckets
            .lock()
            .expect("bucket map poisoned")
            .get(bucket)
            .map(|b| b.len())
            .unwrap_or(0)
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<()> {
        self.buckets
            .lock()
            .expect("bucket map poisoned")
            .entry(bucket.to_string())
            .or_default();
        Ok(())
    }

    async fn list_page(&self, bucket: &str, token: Option<&str>) -> StorageResult<ListPage> {
        let buckets = self.buckets.lock().expect("bucket map poisoned");
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;

        let mut page: Vec<ObjectSummary> = Vec::with_capacity(self.page_size);
        let mut remaining = false;
        for (key, body) in objects.iter() {
            if let Some(marker) = token {
                if key.as_str() <= marker {
                    continue;
                }
            }
            if page.len() == self.page_size {
                remaining = true;
                break;
            }
            page.push(ObjectSummary {
                key: key.clone(),
                size: body.len() as i64,
            });
        }

        let next_token = if remaining {
            page.last().map(|object| object.key.clone())
        } else {
            None
        };

        Ok(ListPage {
            objects: page,
            is_truncated: remaining,
            next_token,
        })
    }

    async fn download(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let buckets = self.buckets.lock().expect("bucket map poisoned");
        buckets
            .get(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("{bucket}/{key}")))
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        _options: &UploadOptions,
    ) -> StorageResult<()> {
        let mut buckets = self.buckets.lock().expect("bucket map poisoned");
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;
        objects.insert(key.to_string(), body);
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let buckets = self.buckets.lock().expect("bucket map poisoned");
        let exists = buckets
            .get(bucket)
            .is_some_and(|objects| objects.contains_key(key));
        if !exists {
            return Err(StorageError::NotFound(format!("{bucket}/{key}")));
        }
        Ok(format!(
            "memory://{bucket}/{key}?expires={}",
            expires_in.as_secs()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_download_round_trip() {
        let store = MemoryObjectStore::new();
        store.ensure_bucket("input").await.unwrap();

        store
            .upload("input", "a.txt", b"DrugA,ReactionB".to_vec(), &UploadOptions::default())
            .await
            .unwrap();

        let data = store.download("input", "a.txt").await.unwrap();
        assert_eq!(data, b"DrugA,ReactionB");
    }

    #[tokio::test]
    async fn ensure_bucket_is_idempotent_and_keeps_contents() {
        let store = MemoryObjectStore::new();
        store.ensure_bucket("input").await.unwrap();
        store
            .upload("input", "a.txt", b"x".to_vec(), &UploadOptions::default())
            .await
            .unwrap();

        store.ensure_bucket("input").await.unwrap();
        assert_eq!(store.object_count("input"), 1);
    }

    #[tokio::test]
    async fn missing_bucket_and_key_are_reported() {
        let store = MemoryObjectStore::new();
        assert!(matches!(
            store.download("nope", "a").await,
            Err(StorageError::BucketNotFound(_))
        ));

        store.ensure_bucket("input").await.unwrap();
        assert!(matches!(
            store.download("input", "missing").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn listing_pages_through_all_objects() {
        let store = MemoryObjectStore::with_page_size(2);
        store.ensure_bucket("input").await.unwrap();
        for name in ["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"] {
            store
                .upload("input", name, b"x".to_vec(), &UploadOptions::default())
                .await
                .unwrap();
        }

        let mut token: Option<String> = None;
        let mut pages = 0;
        let mut keys = Vec::new();
        loop {
            let page = store.list_page("input", token.as_deref()).await.unwrap();
            pages += 1;
            keys.extend(page.objects.iter().map(|o| o.key.clone()));
            if !page.is_truncated {
                assert!(page.next_token.is_none());
                break;
            }
            token = page.next_token;
        }

        assert_eq!(pages, 3);
        assert_eq!(keys, vec!["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"]);
    }

    #[tokio::test]
    async fn presign_requires_existing_object() {
        let store = MemoryObjectStore::new();
        store.ensure_bucket("out").await.unwrap();
        store
            .upload("out", "a.txt", b"x".to_vec(), &UploadOptions::default())
            .await
            .unwrap();

        let url = store
            .presign_get("out", "a.txt", Duration::from_secs(900))
            .await
            .unwrap();
        assert_eq!(url, "memory://out/a.txt?expires=900");

        assert!(store
            .presign_get("out", "missing.txt", Duration::from_secs(900))
            .await
            .is_err());
    }
}
