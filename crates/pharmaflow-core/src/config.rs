//! Configuration module
//!
//! Environment-driven configuration for the transformer and publisher tools.
//! Every knob can be set through `PHARMAFLOW_*` variables (or the usual
//! `AWS_REGION` / `S3_*` variables for client construction); defaults
//! reproduce the historical batch constants so a bare environment with only
//! the bucket/topic names set is enough to run.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_OBJECT_SUFFIX: &str = ".txt";
const DEFAULT_CONTACT_NAME: &str = "John Doe";
const DEFAULT_JSON_COMMENT: &str = "DataTransformer JSON";
const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 15 * 60;
const DEFAULT_EMAIL_SUBJECT: &str = "Status of pharmaceuticals order.";
const DEFAULT_EMAIL_MESSAGE: &str =
    "Your pharmaceutical supplies will be shipped 5 business days from the date of order.";
const DEFAULT_ORDER_DETAILS: &str = "Ibuprofen, Acetaminophen";
const DEFAULT_ORDER_DATE_PREFIX: &str = "2015/10";
const DEFAULT_MESSAGE_COUNT: u32 = 10;

/// Configuration for the object transformer batch run.
#[derive(Clone, Debug)]
pub struct TransformerConfig {
    pub input_bucket: String,
    pub output_bucket: String,
    /// Only keys ending in this suffix are transformed.
    pub object_suffix: String,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    /// Value of the `contact` metadata header on uploaded objects.
    pub contact_name: String,
    pub presign_expiry: Duration,
    /// Upload with an SSE-C customer key when true.
    pub sse_enabled: bool,
    /// Ordered attribute names that positionally label comma-separated values.
    pub attributes: Vec<String>,
    pub json_comment: String,
}

impl TransformerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            input_bucket: require("PHARMAFLOW_INPUT_BUCKET")?,
            output_bucket: require("PHARMAFLOW_OUTPUT_BUCKET")?,
            object_suffix: optional("PHARMAFLOW_OBJECT_SUFFIX")
                .unwrap_or_else(|| DEFAULT_OBJECT_SUFFIX.to_string()),
            region: optional("S3_REGION").or_else(|| optional("AWS_REGION")),
            endpoint: optional("S3_ENDPOINT"),
            contact_name: optional("PHARMAFLOW_CONTACT_NAME")
                .unwrap_or_else(|| DEFAULT_CONTACT_NAME.to_string()),
            presign_expiry: Duration::from_secs(parse_or(
                "PHARMAFLOW_PRESIGN_EXPIRY_SECS",
                DEFAULT_PRESIGN_EXPIRY_SECS,
            )?),
            sse_enabled: parse_bool_or("PHARMAFLOW_SSE", true)?,
            attributes: optional("PHARMAFLOW_ATTRIBUTES")
                .map(|raw| parse_attributes(&raw))
                .unwrap_or_else(default_attributes),
            json_comment: optional("PHARMAFLOW_JSON_COMMENT")
                .unwrap_or_else(|| DEFAULT_JSON_COMMENT.to_string()),
        })
    }
}

/// Configuration for the notification publisher run.
#[derive(Clone, Debug)]
pub struct PublisherConfig {
    pub email_topic_arn: String,
    pub order_topic_arn: String,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub email_subject: String,
    pub email_message: String,
    pub order_details: String,
    /// Prefix for the per-order date string; order `i` gets `<prefix>/<i>`.
    pub order_date_prefix: String,
    pub message_count: u32,
}

impl PublisherConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            email_topic_arn: require("PHARMAFLOW_EMAIL_TOPIC_ARN")?,
            order_topic_arn: require("PHARMAFLOW_ORDER_TOPIC_ARN")?,
            region: optional("AWS_REGION"),
            endpoint: optional("SNS_ENDPOINT"),
            email_subject: optional("PHARMAFLOW_EMAIL_SUBJECT")
                .unwrap_or_else(|| DEFAULT_EMAIL_SUBJECT.to_string()),
            email_message: optional("PHARMAFLOW_EMAIL_MESSAGE")
                .unwrap_or_else(|| DEFAULT_EMAIL_MESSAGE.to_string()),
            order_details: optional("PHARMAFLOW_ORDER_DETAILS")
                .unwrap_or_else(|| DEFAULT_ORDER_DETAILS.to_string()),
            order_date_prefix: optional("PHARMAFLOW_ORDER_DATE_PREFIX")
                .unwrap_or_else(|| DEFAULT_ORDER_DATE_PREFIX.to_string()),
            message_count: parse_or("PHARMAFLOW_MESSAGE_COUNT", DEFAULT_MESSAGE_COUNT)?,
        })
    }
}

/// Default attribute schema for pharmaceutical adverse-reaction drops.
pub fn default_attributes() -> Vec<String> {
    vec!["genericDrugName".to_string(), "adverseReaction".to_string()]
}

fn parse_attributes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::MissingVar(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidVar { name, value }),
    }
}

fn parse_bool_or(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match optional(name) {
        None => Ok(default),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidVar { name, value }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_attributes_trims_and_drops_empties() {
        assert_eq!(
            parse_attributes("genericDrugName, adverseReaction,,"),
            vec!["genericDrugName", "adverseReaction"]
        );
    }

    #[test]
    fn default_attributes_match_schema() {
        assert_eq!(
            default_attributes(),
            vec!["genericDrugName", "adverseReaction"]
        );
    }

    // Env-dependent assertions live in one test because the process
    // environment is shared across the test harness threads.
    #[test]
    fn transformer_config_from_env() {
        env::set_var("PHARMAFLOW_INPUT_BUCKET", "in-bucket");
        env::set_var("PHARMAFLOW_OUTPUT_BUCKET", "out-bucket");

        let config = TransformerConfig::from_env().unwrap();
        assert_eq!(config.input_bucket, "in-bucket");
        assert_eq!(config.output_bucket, "out-bucket");
        assert_eq!(config.object_suffix, ".txt");
        assert_eq!(config.contact_name, "John Doe");
        assert_eq!(config.presign_expiry, Duration::from_secs(900));
        assert!(config.sse_enabled);
        assert_eq!(config.json_comment, "DataTransformer JSON");
        assert_eq!(config.attributes, default_attributes());

        env::remove_var("PHARMAFLOW_INPUT_BUCKET");
        assert!(matches!(
            TransformerConfig::from_env(),
            Err(ConfigError::MissingVar("PHARMAFLOW_INPUT_BUCKET"))
        ));
        env::remove_var("PHARMAFLOW_OUTPUT_BUCKET");
    }
}
