//! S3 storage backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::RequestId;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;

use crate::traits::{
    ListPage, ObjectStore, ObjectSummary, StorageError, StorageResult, UploadOptions,
};

/// S3-backed `ObjectStore`.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    region: String,
    endpoint_url: Option<String>,
}

impl S3ObjectStore {
    /// Create a new S3ObjectStore.
    ///
    /// # Arguments
    /// * `region` - AWS region; falls back to the ambient provider chain,
    ///   then us-east-1
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible
    ///   providers (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(region: Option<String>, endpoint_url: Option<String>) -> StorageResult<Self> {
        let region_provider = RegionProviderChain::first_try(region.map(Region::new))
            .or_default_provider()
            .or_else(Region::new("us-east-1"));

        // The batch drivers have no retry policy by design; a failed call
        // fails the run, so the client must not retry underneath them.
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(RetryConfig::disabled())
            .load()
            .await;

        let resolved_region = config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "us-east-1".to_string());

        // S3-compatible providers need path-style addressing.
        let client = if let Some(ref endpoint) = endpoint_url {
            let s3_config = aws_sdk_s3::config::Builder::from(&config)
                .endpoint_url(endpoint)
                .force_path_style(true)
                .build();
            Client::from_conf(s3_config)
        } else {
            Client::new(&config)
        };

        Ok(S3ObjectStore {
            client,
            region: resolved_region,
            endpoint_url,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    async fn create_bucket(&self, bucket: &str) -> StorageResult<()> {
        tracing::info!(bucket = %bucket, region = %self.region, "creating bucket");

        let mut request = self.client.create_bucket().bucket(bucket);
        // us-east-1 is the default location and rejects an explicit constraint.
        if self.region != "us-east-1" {
            let constraint = BucketLocationConstraint::from(self.region.as_str());
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(constraint)
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => Ok(()),
            Err(SdkError::ServiceError(ref ctx)) if ctx.err().is_bucket_already_owned_by_you() => {
                Ok(())
            }
            Err(SdkError::ServiceError(ref ctx)) if ctx.err().is_bucket_already_exists() => {
                tracing::warn!(
                    bucket = %bucket,
                    "bucket name is taken by another account; specify a globally unique name"
                );
                Ok(())
            }
            Err(err) => Err(map_sdk_err("CreateBucket", err)),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<()> {
        let err = match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => {
                tracing::debug!(bucket = %bucket, "bucket exists");
                return Ok(());
            }
            Err(err) => err,
        };

        let action = match &err {
            SdkError::ServiceError(ctx) => {
                head_failure_action(ctx.err().is_not_found(), ctx.raw().status().as_u16())
            }
            _ => EnsureAction::Fail,
        };

        match action {
            EnsureAction::Create => self.create_bucket(bucket).await,
            EnsureAction::WarnForeignOwner => {
                tracing::warn!(
                    bucket = %bucket,
                    "bucket is owned by another account; specify a globally unique name"
                );
                Ok(())
            }
            EnsureAction::Fail => Err(map_sdk_err("HeadBucket", err)),
        }
    }

    async fn list_page(&self, bucket: &str, token: Option<&str>) -> StorageResult<ListPage> {
        let mut request = self.client.list_objects_v2().bucket(bucket);
        if let Some(token) = token {
            request = request.continuation_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| map_sdk_err("ListObjectsV2", err))?;

        let objects = response
            .contents()
            .iter()
            .filter_map(|object| {
                object.key().map(|key| ObjectSummary {
                    key: key.to_string(),
                    size: object.size().unwrap_or(0),
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            bucket = %bucket,
            count = objects.len(),
            truncated = response.is_truncated().unwrap_or(false),
            "listed objects"
        );

        Ok(ListPage {
            objects,
            is_truncated: response.is_truncated().unwrap_or(false),
            next_token: response.next_continuation_token().map(str::to_string),
        })
    }

    async fn download(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let start = Instant::now();

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| map_sdk_err("GetObject", err))?;

        let data = response.body.collect().await.map_err(|err| {
            StorageError::Client {
                operation: "GetObject",
                message: format!("failed to read object body: {err}"),
            }
        })?;
        let bytes = data.into_bytes().to_vec();

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes)
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        options: &UploadOptions,
    ) -> StorageResult<()> {
        let size = body.len();
        let encrypted = options.encryption.is_some();
        let start = Instant::now();

        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body));

        if let Some(ref content_type) = options.content_type {
            request = request.content_type(content_type);
        }
        if let Some(ref title) = options.title {
            request = request.metadata("title", title);
        }
        if let Some(ref contact) = options.contact {
            request = request.metadata("contact", contact);
        }
        if let Some(ref sse) = options.encryption {
            request = request
                .sse_customer_algorithm(sse.algorithm())
                .sse_customer_key(sse.key_b64())
                .sse_customer_key_md5(sse.key_md5_b64());
        }

        match request.send().await {
            Ok(_) => {
                tracing::info!(
                    bucket = %bucket,
                    key = %key,
                    size_bytes = size,
                    encrypted = encrypted,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload successful"
                );
                Ok(())
            }
            Err(err) => {
                tracing::error!(
                    bucket = %bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                Err(map_sdk_err("PutObject", err))
            }
        }
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let presigning_config = PresigningConfig::expires_in(expires_in)
            .map_err(|err| StorageError::Config(format!("invalid presign expiry: {err}")))?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|err| map_sdk_err("GetObject", err))?;

        Ok(presigned.uri().to_string())
    }
}

/// What `ensure_bucket` does after a failed HEAD on the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnsureAction {
    /// Bucket is absent: create it.
    Create,
    /// Name collision with another account: warn and continue, so the first
    /// real operation against the bucket surfaces a clearer error.
    WarnForeignOwner,
    /// Anything else fails the run.
    Fail,
}

fn head_failure_action(not_found: bool, status: u16) -> EnsureAction {
    if not_found || status == 404 {
        EnsureAction::Create
    } else if status == 403 {
        EnsureAction::WarnForeignOwner
    } else {
        EnsureAction::Fail
    }
}

/// Map an SDK error into the two fault categories: service faults keep
/// status, error code, and request id; everything else is a client fault
/// reported by message.
fn map_sdk_err<E>(operation: &'static str, err: SdkError<E>) -> StorageError
where
    E: ProvideErrorMetadata + RequestId + std::error::Error + Send + Sync + 'static,
{
    match err {
        SdkError::ServiceError(ctx) => {
            let status = ctx.raw().status().as_u16();
            let err = ctx.err();
            StorageError::Service {
                operation,
                status,
                code: err.code().map(str::to_string),
                request_id: err.request_id().map(str::to_string),
                message: err
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| err.to_string()),
            }
        }
        other => {
            let mut message = other.to_string();
            let mut source = std::error::Error::source(&other);
            while let Some(err) = source {
                message.push_str(": ");
                message.push_str(&err.to_string());
                source = err.source();
            }
            StorageError::Client { operation, message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_bucket_triggers_creation() {
        assert_eq!(head_failure_action(true, 404), EnsureAction::Create);
        // some S3-compatible providers report 404 without the typed error
        assert_eq!(head_failure_action(false, 404), EnsureAction::Create);
    }

    #[test]
    fn foreign_owned_bucket_warns_instead_of_failing() {
        assert_eq!(head_failure_action(false, 403), EnsureAction::WarnForeignOwner);
    }

    #[test]
    fn other_head_failures_fail_the_run() {
        assert_eq!(head_failure_action(false, 301), EnsureAction::Fail);
        assert_eq!(head_failure_action(false, 500), EnsureAction::Fail);
        assert_eq!(head_failure_action(false, 503), EnsureAction::Fail);
    }
}
