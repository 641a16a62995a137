//! Pharmaflow notify library
//!
//! Pub/sub notification abstraction: the `Notifier` trait plus an SNS
//! backend used by the publisher driver.

pub mod sns;
pub mod traits;

// Re-export commonly used types
pub use sns::SnsNotifier;
pub use traits::{Notifier, NotifyError, NotifyResult};
