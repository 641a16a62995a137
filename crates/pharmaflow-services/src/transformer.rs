//! Object transformer batch driver.
//!
//! Walks every listing page of the input bucket, transforms each matching
//! object's comma-separated lines into record blocks, uploads the result to
//! the output bucket, and collects one presigned GET URL per transformed
//! object. Execution is sequential; the first storage error aborts the run.

use pharmaflow_core::{RecordSchema, TransformerConfig};
use pharmaflow_storage::{ObjectStore, SseKey, StorageResult, UploadOptions};

/// Result of one transformer run, returned to the caller instead of being
/// accumulated in shared state.
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    /// Objects enumerated in the input bucket, matching or not.
    pub objects_seen: usize,
    /// Objects that matched the suffix and were transformed and uploaded.
    pub objects_transformed: usize,
    /// One presigned GET URL per transformed object, in listing order.
    pub presigned_urls: Vec<String>,
    /// The customer key every uploaded object was encrypted with, when
    /// encryption was enabled. The service keeps no copy; the caller must
    /// persist this to ever read the uploaded objects (the presigned URLs
    /// only work with the key headers supplied).
    pub encryption_key: Option<SseKey>,
}

/// Run the transformer over every matching object in the input bucket.
pub async fn run_transformer(
    store: &dyn ObjectStore,
    schema: &RecordSchema,
    config: &TransformerConfig,
) -> StorageResult<TransformOutcome> {
    tracing::info!(
        input_bucket = %config.input_bucket,
        output_bucket = %config.output_bucket,
        suffix = %config.object_suffix,
        sse = config.sse_enabled,
        "starting transformer run"
    );

    store.ensure_bucket(&config.input_bucket).await?;
    store.ensure_bucket(&config.output_bucket).await?;

    // One customer key per run; every uploaded object is encrypted with it.
    let encryption = config.sse_enabled.then(SseKey::generate);

    let mut outcome = TransformOutcome {
        encryption_key: encryption.clone(),
        ..TransformOutcome::default()
    };
    let mut token: Option<String> = None;
    loop {
        let page = store
            .list_page(&config.input_bucket, token.as_deref())
            .await?;

        for object in &page.objects {
            outcome.objects_seen += 1;
            if !object.key.ends_with(&config.object_suffix) {
                tracing::debug!(key = %object.key, "skipping object without suffix");
                continue;
            }

            tracing::info!(key = %object.key, "transforming object");
            let data = store.download(&config.input_bucket, &object.key).await?;
            let transformed = schema.transform_bytes(&data);

            let options = UploadOptions {
                content_type: Some("application/json".to_string()),
                title: Some(object.key.clone()),
                contact: Some(config.contact_name.clone()),
                encryption: encryption.clone(),
            };
            store
                .upload(
                    &config.output_bucket,
                    &object.key,
                    transformed.into_bytes(),
                    &options,
                )
                .await?;

            let url = store
                .presign_get(&config.output_bucket, &object.key, config.presign_expiry)
                .await?;
            outcome.presigned_urls.push(url);
            outcome.objects_transformed += 1;
        }

        if !page.is_truncated {
            break;
        }
        token = page.next_token;
    }

    for url in &outcome.presigned_urls {
        tracing::info!(url = %url, "presigned URL");
    }
    tracing::info!(
        objects_seen = outcome.objects_seen,
        objects_transformed = outcome.objects_transformed,
        "transformer run complete"
    );

    Ok(outcome)
}
