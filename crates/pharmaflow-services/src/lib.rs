//! Pharmaflow services layer
//!
//! This crate hosts the batch drivers: the object transformer (list,
//! transform, upload, presign) and the notification publisher (one email
//! message plus a numbered run of order records). Both are written against
//! the storage/notify traits so the CLI stays thin and the drivers are
//! testable without cloud credentials.

pub mod publisher;
pub mod transformer;

pub use publisher::{run_publisher, PublishError, PublishOutcome};
pub use transformer::{run_transformer, TransformOutcome};
