//! Notification abstraction trait.

use async_trait::async_trait;
use thiserror::Error;

/// Notification errors, split into the same two fault categories as storage:
/// service faults carry status/code/request id, client faults a message only.
#[derive(Debug, Error)]
pub enum NotifyError {
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
}

/// Result type for notification operations
pub type NotifyResult<T> = Result<T, NotifyError>;

/// A pub/sub publisher. Implementations return the service-assigned message
/// id for each publish.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish `message` to `topic_arn`.
    async fn publish(&self, topic_arn: &str, message: &str) -> NotifyResult<String>;

    /// Publish `message` with a subject line (email-style delivery).
    async fn publish_with_subject(
        &self,
        topic_arn: &str,
        message: &str,
        subject: &str,
    ) -> NotifyResult<String>;
}
