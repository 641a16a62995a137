//! Pharmaflow CLI — batch tools for the pharmaceutical data pipeline.
//!
//! `transform` reads `.txt` drops from the input bucket, rewrites each
//! comma-separated line as a record block in the output bucket, and prints
//! one presigned URL per transformed object. `publish` sends the email
//! notification and the numbered order records to their topics.
//!
//! Configuration comes from `PHARMAFLOW_*` environment variables (a `.env`
//! file is honored); flags override the environment per run.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pharmaflow_cli::init_tracing;
use pharmaflow_core::{PublisherConfig, RecordSchema, TransformerConfig};
use pharmaflow_notify::SnsNotifier;
use pharmaflow_services::{run_publisher, run_transformer};
use pharmaflow_storage::S3ObjectStore;

#[derive(Parser)]
#[command(name = "pharmaflow", about = "Pharmaceutical data batch tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform text drops from the input bucket into record blocks
    Transform {
        /// Source bucket (overrides PHARMAFLOW_INPUT_BUCKET)
        #[arg(long)]
        input_bucket: Option<String>,
        /// Destination bucket (overrides PHARMAFLOW_OUTPUT_BUCKET)
        #[arg(long)]
        output_bucket: Option<String>,
        /// Only transform keys ending in this suffix
        #[arg(long)]
        suffix: Option<String>,
        /// Upload without SSE-C encryption
        #[arg(long)]
        no_encryption: bool,
    },
    /// Publish the email notification and numbered order records
    Publish {
        /// Number of order records to publish (overrides PHARMAFLOW_MESSAGE_COUNT)
        #[arg(long)]
        count: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transform {
            input_bucket,
            output_bucket,
            suffix,
            no_encryption,
        } => {
            let mut config =
                TransformerConfig::from_env().context("Failed to load transformer configuration")?;
            if let Some(bucket) = input_bucket {
                config.input_bucket = bucket;
            }
            if let Some(bucket) = output_bucket {
                config.output_bucket = bucket;
            }
            if let Some(suffix) = suffix {
                config.object_suffix = suffix;
            }
            if no_encryption {
                config.sse_enabled = false;
            }

            let store = S3ObjectStore::new(config.region.clone(), config.endpoint.clone())
                .await
                .context("Failed to create S3 client")?;
            let schema = RecordSchema::new(config.attributes.clone(), config.json_comment.clone());

            let outcome = run_transformer(&store, &schema, &config).await?;

            println!(
                "Transformed {} of {} objects",
                outcome.objects_transformed, outcome.objects_seen
            );
            if let Some(key) = &outcome.encryption_key {
                // Without this key the uploaded objects (and the presigned
                // URLs below) are unreadable; it is printed once and never
                // stored anywhere else.
                println!("SSE-C key (base64): {}", key.key_b64());
            }
            for url in &outcome.presigned_urls {
                println!("{}", url);
            }
        }
        Commands::Publish { count } => {
            let mut config =
                PublisherConfig::from_env().context("Failed to load publisher configuration")?;
            if let Some(count) = count {
                config.message_count = count;
            }

            let notifier = SnsNotifier::new(config.region.clone(), config.endpoint.clone())
                .await
                .context("Failed to create SNS client")?;

            let outcome = run_publisher(&notifier, &config).await?;

            println!("Published email message {}", outcome.email_message_id);
            println!("Published {} order records", outcome.order_message_ids.len());
        }
    }

    Ok(())
}
