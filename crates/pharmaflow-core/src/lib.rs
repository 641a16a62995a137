//! Pharmaflow core library
//!
//! Configuration, error types, domain models, and the record transform logic
//! shared by the storage, notification, and service crates.

pub mod config;
pub mod error;
pub mod models;
pub mod transform;

// Re-export commonly used types
pub use config::{PublisherConfig, TransformerConfig};
pub use error::ConfigError;
pub use models::Order;
pub use transform::RecordSchema;
