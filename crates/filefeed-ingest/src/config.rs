//! Configuration for an ingestion run
//!
//! Settings come from command-line flags (see `main.rs`) or, when the library
//! is embedded, from `FILEFEED_*` environment variables.

use crate::error::{IngestError, Result};
use filefeed_common::types::{parse_brokers, PublisherConfig};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Broker list used when none is given
pub const DEFAULT_BROKERS: &str = "localhost:9092";

/// Everything one run of the pipeline needs
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// File listing one path pattern per line
    pub manifest: PathBuf,

    /// Broker addresses, topic and delivery settings
    pub publisher: PublisherConfig,

    /// Upper bound on concurrently running workers; `None` runs one per pattern at once
    pub max_workers: Option<usize>,

    /// Draw a progress bar while workers run
    pub show_progress: bool,
}

impl IngestConfig {
    pub fn new(manifest: impl Into<PathBuf>, publisher: PublisherConfig) -> Self {
        Self {
            manifest: manifest.into(),
            publisher,
            max_workers: None,
            show_progress: false,
        }
    }

    /// Load config from environment variables
    ///
    /// - `FILEFEED_MANIFEST` (required)
    /// - `FILEFEED_TOPIC` (required)
    /// - `FILEFEED_BROKERS` (default `localhost:9092`)
    /// - `FILEFEED_CLIENT_ID`
    /// - `FILEFEED_MAX_WORKERS`
    /// - `FILEFEED_DELIVERY_TIMEOUT_MS`
    pub fn from_env() -> Result<Self> {
        let manifest = std::env::var("FILEFEED_MANIFEST")
            .map_err(|_| IngestError::config("FILEFEED_MANIFEST is not set"))?;
        let topic = std::env::var("FILEFEED_TOPIC")
            .map_err(|_| IngestError::config("FILEFEED_TOPIC is not set"))?;
        let brokers =
            std::env::var("FILEFEED_BROKERS").unwrap_or_else(|_| DEFAULT_BROKERS.to_string());

        let mut publisher = PublisherConfig::new(parse_brokers(&brokers), topic);

        if let Ok(client_id) = std::env::var("FILEFEED_CLIENT_ID") {
            publisher = publisher.with_client_id(client_id);
        }

        if let Ok(ms) = std::env::var("FILEFEED_DELIVERY_TIMEOUT_MS") {
            let ms: u64 = ms.parse().map_err(|_| {
                IngestError::config(format!("Invalid FILEFEED_DELIVERY_TIMEOUT_MS: '{}'", ms))
            })?;
            publisher = publisher.with_delivery_timeout(Duration::from_millis(ms));
        }

        let mut config = Self::new(manifest, publisher);

        if let Ok(workers) = std::env::var("FILEFEED_MAX_WORKERS") {
            let workers: usize = workers.parse().map_err(|_| {
                IngestError::config(format!("Invalid FILEFEED_MAX_WORKERS: '{}'", workers))
            })?;
            config = config.with_max_workers(Some(workers));
        }

        Ok(config)
    }

    pub fn with_max_workers(mut self, max_workers: Option<usize>) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Reject settings that would make the run pointless before anything starts
    pub fn validate(&self) -> Result<()> {
        if self.manifest.as_os_str().is_empty() {
            return Err(IngestError::config("Manifest path cannot be empty"));
        }

        if self.max_workers == Some(0) {
            return Err(IngestError::config("max_workers must be at least 1"));
        }

        self.publisher.validate()?;
        Ok(())
    }
}
