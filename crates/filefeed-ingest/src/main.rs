//! filefeed-ingest - publish flat file lines to Kafka

use anyhow::Result;
use clap::Parser;
use filefeed_common::logging::{init_logging, LogConfig, LogLevel};
use filefeed_common::types::{parse_brokers, PublisherConfig};
use filefeed_ingest::config::DEFAULT_BROKERS;
use filefeed_ingest::{pipeline, IngestConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "filefeed-ingest")]
#[command(author, version, about = "Publish the lines of flat files to a Kafka topic")]
struct Cli {
    /// File listing one path pattern per line (e.g. /data/auth/a*.txt)
    manifest: PathBuf,

    /// Comma separated broker addresses
    #[arg(short, long, env = "FILEFEED_BROKERS", default_value = DEFAULT_BROKERS)]
    brokers: String,

    /// Topic to publish to
    #[arg(short, long, env = "FILEFEED_TOPIC")]
    topic: String,

    /// Client id reported to the brokers (defaults to the host name)
    #[arg(long, env = "FILEFEED_CLIENT_ID")]
    client_id: Option<String>,

    /// Maximum number of paths processed at once (default: all)
    #[arg(long, env = "FILEFEED_MAX_WORKERS")]
    max_workers: Option<usize>,

    /// Milliseconds a message may take to be acknowledged before it counts as failed
    #[arg(long, env = "FILEFEED_DELIVERY_TIMEOUT_MS", default_value_t = 30_000)]
    delivery_timeout_ms: u64,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> IngestConfig {
        let mut publisher = PublisherConfig::new(parse_brokers(&self.brokers), self.topic)
            .with_delivery_timeout(Duration::from_millis(self.delivery_timeout_ms));

        if let Some(client_id) = self.client_id {
            publisher = publisher.with_client_id(client_id);
        }

        IngestConfig::new(self.manifest, publisher)
            .with_max_workers(self.max_workers)
            .with_progress(!self.no_progress)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over flags
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("filefeed-ingest")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    let config = cli.into_config();
    info!(
        manifest = %config.manifest.display(),
        brokers = %config.publisher.bootstrap_servers(),
        topic = %config.publisher.topic,
        "Starting ingestion"
    );

    match pipeline::run(&config).await {
        Ok(report) => {
            info!(summary = %report, "Ingestion complete");
            Ok(())
        },
        Err(e) => {
            error!(error = %e, "Ingestion failed");
            Err(e.into())
        },
    }
}
