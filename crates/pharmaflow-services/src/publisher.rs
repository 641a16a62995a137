//! Notification publisher driver.
//!
//! Publishes one fixed subject/body message to the email topic, then a
//! numbered run of JSON order records to the order topic. Sequential, no
//! retries; the first failed publish aborts the run.

use pharmaflow_core::{Order, PublisherConfig};
use pharmaflow_notify::{Notifier, NotifyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("Failed to serialize order {order_id}: {source}")]
    Serialize {
        order_id: u32,
        source: serde_json::Error,
    },
}

/// Result of one publisher run.
#[derive(Debug, Clone, Default)]
pub struct PublishOutcome {
    pub email_message_id: String,
    /// Message ids for the order records, in publish order.
    pub order_message_ids: Vec<String>,
}

/// Publish the email notification and the numbered order records.
pub async fn run_publisher(
    notifier: &dyn Notifier,
    config: &PublisherConfig,
) -> Result<PublishOutcome, PublishError> {
    tracing::info!(
        email_topic = %config.email_topic_arn,
        order_topic = %config.order_topic_arn,
        count = config.message_count,
        "starting publisher run"
    );

    let email_message_id = notifier
        .publish_with_subject(
            &config.email_topic_arn,
            &config.email_message,
            &config.email_subject,
        )
        .await?;
    tracing::info!(message_id = %email_message_id, "published email notification");

    let mut order_message_ids = Vec::with_capacity(config.message_count as usize);
    for i in 1..=config.message_count {
        let order = Order::new(
            i,
            format!("{}/{}", config.order_date_prefix, i),
            config.order_details.clone(),
        );
        let payload = serde_json::to_string(&order)
            .map_err(|source| PublishError::Serialize { order_id: i, source })?;

        tracing::info!(order_id = i, "publishing order");
        let message_id = notifier.publish(&config.order_topic_arn, &payload).await?;
        order_message_ids.push(message_id);
    }

    tracing::info!(
        orders = order_message_ids.len(),
        "publisher run complete"
    );

    Ok(PublishOutcome {
        email_message_id,
        order_message_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pharmaflow_notify::NotifyResult;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Published {
        topic_arn: String,
        message: String,
        subject: Option<String>,
    }

    /// Records every publish and hands back sequential message ids.
    #[derive(Default)]
    struct RecordingNotifier {
        published: Mutex<Vec<Published>>,
    }

    impl RecordingNotifier {
        fn record(&self, topic_arn: &str, message: &str, subject: Option<&str>) -> String {
            let mut published = self.published.lock().unwrap();
            published.push(Published {
                topic_arn: topic_arn.to_string(),
                message: message.to_string(),
                subject: subject.map(str::to_string),
            });
            format!("msg-{}", published.len())
        }

        fn published(&self) -> Vec<Published> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn publish(&self, topic_arn: &str, message: &str) -> NotifyResult<String> {
            Ok(self.record(topic_arn, message, None))
        }

        async fn publish_with_subject(
            &self,
            topic_arn: &str,
            message: &str,
            subject: &str,
        ) -> NotifyResult<String> {
            Ok(self.record(topic_arn, message, Some(subject)))
        }
    }

    fn test_config() -> PublisherConfig {
        PublisherConfig {
            email_topic_arn: "arn:aws:sns:us-east-1:000000000000:EmailTopic".to_string(),
            order_topic_arn: "arn:aws:sns:us-east-1:000000000000:OrderTopic".to_string(),
            region: None,
            endpoint: None,
            email_subject: "Status of pharmaceuticals order.".to_string(),
            email_message:
                "Your pharmaceutical supplies will be shipped 5 business days from the date of order."
                    .to_string(),
            order_details: "Ibuprofen, Acetaminophen".to_string(),
            order_date_prefix: "2015/10".to_string(),
            message_count: 10,
        }
    }

    #[tokio::test]
    async fn publishes_email_then_numbered_orders() {
        let notifier = RecordingNotifier::default();
        let config = test_config();

        let outcome = run_publisher(&notifier, &config).await.unwrap();
        assert_eq!(outcome.email_message_id, "msg-1");
        assert_eq!(outcome.order_message_ids.len(), 10);

        let published = notifier.published();
        assert_eq!(published.len(), 11);

        let email = &published[0];
        assert_eq!(email.topic_arn, config.email_topic_arn);
        assert_eq!(email.subject.as_deref(), Some("Status of pharmaceuticals order."));
        assert_eq!(email.message, config.email_message);

        for (index, entry) in published[1..].iter().enumerate() {
            let i = index + 1;
            assert_eq!(entry.topic_arn, config.order_topic_arn);
            assert_eq!(entry.subject, None);

            let order: Order = serde_json::from_str(&entry.message).unwrap();
            assert_eq!(order.order_id, i as u32);
            assert_eq!(order.order_date, format!("2015/10/{i}"));
            assert_eq!(order.order_details, "Ibuprofen, Acetaminophen");
        }
    }

    #[tokio::test]
    async fn order_payload_uses_camel_case_field_names() {
        let notifier = RecordingNotifier::default();
        let mut config = test_config();
        config.message_count = 1;

        run_publisher(&notifier, &config).await.unwrap();

        let published = notifier.published();
        let payload: serde_json::Value = serde_json::from_str(&published[1].message).unwrap();
        assert_eq!(payload["orderId"], 1);
        assert_eq!(payload["orderDate"], "2015/10/1");
        assert_eq!(payload["orderDetails"], "Ibuprofen, Acetaminophen");
    }

    #[tokio::test]
    async fn zero_count_publishes_only_the_email() {
        let notifier = RecordingNotifier::default();
        let mut config = test_config();
        config.message_count = 0;

        let outcome = run_publisher(&notifier, &config).await.unwrap();
        assert!(outcome.order_message_ids.is_empty());
        assert_eq!(notifier.published().len(), 1);
    }
}
