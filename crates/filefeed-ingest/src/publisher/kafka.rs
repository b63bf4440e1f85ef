//! Kafka publisher backed by librdkafka
//!
//! `FutureProducer::send` resolves with exactly one delivery report per
//! record: the broker's acknowledgment, a broker error, or expiry of
//! `message.timeout.ms`.

use super::Publisher;
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use filefeed_common::types::{DeliveryOutcome, Message, PublisherConfig};
use rdkafka::config::{ClientConfig, RDKafkaLogLevel};
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use rdkafka::ClientContext;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How long startup waits for cluster metadata before giving up
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Routes librdkafka's own logs and client errors into `tracing`
pub struct LoggingContext;

impl ClientContext for LoggingContext {
    fn log(&self, level: RDKafkaLogLevel, fac: &str, log_message: &str) {
        match level {
            RDKafkaLogLevel::Emerg
            | RDKafkaLogLevel::Alert
            | RDKafkaLogLevel::Critical
            | RDKafkaLogLevel::Error => {
                error!(target: "librdkafka", facility = fac, "{}", log_message)
            },
            RDKafkaLogLevel::Warning => warn!(target: "librdkafka", facility = fac, "{}", log_message),
            RDKafkaLogLevel::Notice | RDKafkaLogLevel::Info => {
                info!(target: "librdkafka", facility = fac, "{}", log_message)
            },
            RDKafkaLogLevel::Debug => debug!(target: "librdkafka", facility = fac, "{}", log_message),
        }
    }

    fn error(&self, error: KafkaError, reason: &str) {
        error!(target: "librdkafka", error = %error, "{}", reason);
    }
}

/// librdkafka settings for `config`: strongest acknowledgment level, and the
/// delivery timeout as the per-message deadline.
pub fn client_config(config: &PublisherConfig) -> ClientConfig {
    let mut client = ClientConfig::new();
    client
        .set("bootstrap.servers", config.bootstrap_servers())
        .set("client.id", config.client_id.as_str())
        .set("acks", "all")
        // One message in flight per worker, nothing to batch
        .set("linger.ms", "0")
        .set(
            "message.timeout.ms",
            config.delivery_timeout.as_millis().to_string(),
        );
    client
}

/// Publishes to one topic over a single producer shared by every worker
pub struct KafkaPublisher {
    producer: FutureProducer<LoggingContext>,
    config: PublisherConfig,
}

impl KafkaPublisher {
    /// Create the producer and make sure the cluster answers.
    ///
    /// An unreachable cluster is [`IngestError::BrokerUnavailable`].
    pub async fn connect(config: PublisherConfig) -> Result<Self> {
        config.validate()?;

        tokio::task::spawn_blocking(move || Self::connect_blocking(config))
            .await
            .map_err(|e| IngestError::broker_unavailable(format!("connection task failed: {}", e)))?
    }

    fn connect_blocking(config: PublisherConfig) -> Result<Self> {
        let producer: FutureProducer<LoggingContext> = client_config(&config)
            .create_with_context(LoggingContext)
            .map_err(|e| IngestError::config(format!("invalid producer settings: {}", e)))?;

        let metadata = producer
            .client()
            .fetch_metadata(None, CONNECT_TIMEOUT)
            .map_err(|e| {
                IngestError::broker_unavailable(format!("{} ({})", e, config.bootstrap_servers()))
            })?;

        if !metadata.topics().iter().any(|t| t.name() == config.topic) {
            warn!(topic = %config.topic, "Topic not in cluster metadata, relying on auto-creation");
        }

        info!(
            brokers = %config.bootstrap_servers(),
            cluster_brokers = metadata.brokers().len(),
            topic = %config.topic,
            client_id = %config.client_id,
            "Created Kafka producer"
        );

        Ok(Self { producer, config })
    }

    /// Wait for anything still queued in the client
    pub fn flush(&self, timeout: Duration) -> Result<()> {
        self.producer
            .flush(Timeout::After(timeout))
            .map_err(|e| IngestError::broker_unavailable(format!("flush failed: {}", e)))
    }
}

#[async_trait]
impl Publisher for KafkaPublisher {
    async fn publish(&self, message: &Message) -> DeliveryOutcome {
        let payload = match message.to_payload() {
            Ok(payload) => payload,
            Err(e) => return DeliveryOutcome::failed(format!("serialization failed: {}", e)),
        };

        let record: FutureRecord<'_, (), str> =
            FutureRecord::to(&self.config.topic).payload(payload.as_str());

        // The queue timeout only bounds waiting for room in a full local queue
        match self
            .producer
            .send(record, Timeout::After(self.config.delivery_timeout))
            .await
        {
            Ok((partition, offset)) => {
                DeliveryOutcome::delivered(&self.config.topic, partition, offset)
            },
            Err((err, _)) => DeliveryOutcome::failed(err.to_string()),
        }
    }

    fn topic(&self) -> &str {
        &self.config.topic
    }
}
