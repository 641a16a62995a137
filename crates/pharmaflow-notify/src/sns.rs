//! SNS notification backend.

use std::time::Instant;

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sns::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_sns::operation::RequestId;
use aws_sdk_sns::Client;

use crate::traits::{Notifier, NotifyError, NotifyResult};

/// SNS-backed `Notifier`.
#[derive(Clone)]
pub struct SnsNotifier {
    client: Client,
}

impl SnsNotifier {
    /// Create a new SnsNotifier.
    ///
    /// # Arguments
    /// * `region` - AWS region; falls back to the ambient provider chain,
    ///   then us-east-1
    /// * `endpoint_url` - Optional custom endpoint URL (e.g. LocalStack)
    pub async fn new(region: Option<String>, endpoint_url: Option<String>) -> NotifyResult<Self> {
        let region_provider = RegionProviderChain::first_try(region.map(Region::new))
            .or_default_provider()
            .or_else(Region::new("us-east-1"));

        // No retry policy: a failed publish fails the run.
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(RetryConfig::disabled())
            .load()
            .await;

        let client = if let Some(ref endpoint) = endpoint_url {
            let sns_config = aws_sdk_sns::config::Builder::from(&config)
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(sns_config)
        } else {
            Client::new(&config)
        };

        Ok(SnsNotifier { client })
    }

    async fn send(
        &self,
        topic_arn: &str,
        message: &str,
        subject: Option<&str>,
    ) -> NotifyResult<String> {
        let start = Instant::now();

        let mut request = self.client.publish().topic_arn(topic_arn).message(message);
        if let Some(subject) = subject {
            request = request.subject(subject);
        }

        let response = request
            .send()
            .await
            .map_err(|err| map_sdk_err("Publish", err))?;

        let message_id = response.message_id().unwrap_or_default().to_string();
        tracing::info!(
            topic_arn = %topic_arn,
            message_id = %message_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "SNS publish successful"
        );

        Ok(message_id)
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(&self, topic_arn: &str, message: &str) -> NotifyResult<String> {
        self.send(topic_arn, message, None).await
    }

    async fn publish_with_subject(
        &self,
        topic_arn: &str,
        message: &str,
        subject: &str,
    ) -> NotifyResult<String> {
        self.send(topic_arn, message, Some(subject)).await
    }
}

/// Same fault split as the storage backend: service faults keep status, error
/// code, and request id; everything else is a client fault by message.
fn map_sdk_err<E>(operation: &'static str, err: SdkError<E>) -> NotifyError
where
    E: ProvideErrorMetadata + RequestId + std::error::Error + Send + Sync + 'static,
{
    match err {
        SdkError::ServiceError(ctx) => {
            let status = ctx.raw().status().as_u16();
            let err = ctx.err();
            NotifyError::Service {
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
            NotifyError::Client { operation, message }
        }
    }
}
