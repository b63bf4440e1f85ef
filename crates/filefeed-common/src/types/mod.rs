//! Common types used across filefeed

use crate::error::{FeedError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Messages
// ============================================================================

/// A single line of a flat file, addressed by its source file and row.
///
/// Serialized with the field names `File`, `Row` and `Data`. `row` is the
/// 1-based position of the line inside its own file, independent of the order
/// in which files are processed.
///
/// # Examples
///
/// ```
/// use filefeed_common::types::Message;
///
/// let message = Message::from_line("a1.txt", 1, "x");
/// assert_eq!(message.row, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    /// Base name of the file the line came from
    pub file: String,

    /// 1-based row index within `file`
    pub row: u64,

    /// The trimmed line content
    pub data: String,
}

impl Message {
    pub fn from_line(file: impl Into<String>, row: u64, data: impl Into<String>) -> Self {
        debug_assert!(row >= 1, "rows are 1-based");
        Self {
            file: file.into(),
            row,
            data: data.into(),
        }
    }

    /// Wrap this message in the transmission envelope
    pub fn into_envelope(self) -> Envelope {
        Envelope::new(self)
    }

    /// Serialize as the enveloped JSON payload without taking ownership
    pub fn to_payload(&self) -> Result<String> {
        #[derive(Serialize)]
        #[serde(rename_all = "PascalCase")]
        struct Wrapped<'a> {
            record: &'a Message,
        }

        Ok(serde_json::to_string(&Wrapped { record: self })?)
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.row)
    }
}

/// Outer wrapper put around every message before it is sent: `{"Record": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope {
    pub record: Message,
}

impl Envelope {
    pub fn new(record: Message) -> Self {
        Self { record }
    }

    /// Serialize to the JSON text published to the broker.
    ///
    /// Quotes and control characters inside the line are escaped, so
    /// [`Envelope::parse`] always recovers the original message.
    pub fn to_payload(&self) -> Result<String> {
        self.record.to_payload()
    }

    /// Parse a payload produced by [`Envelope::to_payload`]
    pub fn parse(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn into_message(self) -> Message {
        self.record
    }
}

// ============================================================================
// Delivery
// ============================================================================

/// Result of publishing one message; exactly one per publish call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The broker acknowledged the message
    Delivered {
        topic: String,
        partition: i32,
        offset: i64,
    },

    /// The broker (or the client, before submission) rejected the message
    Failed { reason: String },
}

impl DeliveryOutcome {
    pub fn delivered(topic: impl Into<String>, partition: i32, offset: i64) -> Self {
        Self::Delivered {
            topic: topic.into(),
            partition,
            offset,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryOutcome::Delivered {
                topic,
                partition,
                offset,
            } => write!(f, "delivered to {} [{}] at offset {}", topic, partition, offset),
            DeliveryOutcome::Failed { reason } => write!(f, "delivery failed: {}", reason),
        }
    }
}

// ============================================================================
// Publisher Configuration
// ============================================================================

/// Default time librdkafka may spend delivering one message before it
/// reports the delivery as failed.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum topic name length accepted by Kafka
const MAX_TOPIC_LEN: usize = 249;

/// Broker connection parameters, immutable once built and shared by all workers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    /// Broker endpoints as `host:port`
    pub brokers: Vec<String>,

    /// Topic every message is published to
    pub topic: String,

    /// Client id reported to the brokers (defaults to the host name)
    pub client_id: String,

    /// Upper bound on a single delivery, after which it is reported failed
    pub delivery_timeout: Duration,
}

impl PublisherConfig {
    pub fn new(brokers: Vec<String>, topic: impl Into<String>) -> Self {
        Self {
            brokers,
            topic: topic.into(),
            client_id: default_client_id(),
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Broker list in the comma separated form `bootstrap.servers` expects
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }

    /// Check broker addresses and the topic name
    pub fn validate(&self) -> Result<()> {
        if self.brokers.is_empty() {
            return Err(FeedError::config("At least one broker address is required"));
        }

        for broker in &self.brokers {
            validate_broker_address(broker)?;
        }

        validate_topic(&self.topic)?;

        let timeout_ms = self.delivery_timeout.as_millis();
        if timeout_ms == 0 || timeout_ms > i32::MAX as u128 {
            return Err(FeedError::config(format!(
                "Delivery timeout must be between 1 ms and {} ms",
                i32::MAX
            )));
        }

        Ok(())
    }
}

/// Split a comma separated broker list, dropping blanks
pub fn parse_brokers(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(String::from)
        .collect()
}

fn default_client_id() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "filefeed".to_string())
}

fn validate_broker_address(address: &str) -> Result<()> {
    let Some((host, port)) = address.rsplit_once(':') else {
        return Err(FeedError::config(format!(
            "Broker address '{}' must be in host:port form",
            address
        )));
    };

    if host.is_empty() {
        return Err(FeedError::config(format!("Broker address '{}' has no host", address)));
    }

    port.parse::<u16>().map_err(|_| {
        FeedError::config(format!("Broker address '{}' has an invalid port", address))
    })?;

    Ok(())
}

fn validate_topic(topic: &str) -> Result<()> {
    if topic.is_empty() {
        return Err(FeedError::config("Topic name cannot be empty"));
    }

    if topic.len() > MAX_TOPIC_LEN {
        return Err(FeedError::config(format!(
            "Topic name exceeds {} characters",
            MAX_TOPIC_LEN
        )));
    }

    if topic == "." || topic == ".." {
        return Err(FeedError::config(format!("Topic name '{}' is reserved", topic)));
    }

    if let Some(c) = topic
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(FeedError::config(format!(
            "Topic name '{}' contains invalid character '{}'",
            topic, c
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_field_names() {
        let payload = Message::from_line("a1.txt", 1, "x")
            .into_envelope()
            .to_payload()
            .unwrap();
        assert_eq!(payload, r#"{"Record":{"File":"a1.txt","Row":1,"Data":"x"}}"#);
    }

    #[test]
    fn test_envelope_escapes_quotes_and_control_chars() {
        let data = "say \"hi\"\tthen\u{0001}leave \\ now";
        let payload = Message::from_line("q.txt", 7, data)
            .into_envelope()
            .to_payload()
            .unwrap();

        assert!(payload.contains(r#"\"hi\""#));
        assert!(payload.contains(r"\t"));
        assert!(payload.contains(r"\u0001"));
        assert!(!payload.contains('\t'));

        let parsed = Envelope::parse(&payload).unwrap().into_message();
        assert_eq!(parsed, Message::from_line("q.txt", 7, data));
    }

    #[test]
    fn test_borrowed_payload_matches_envelope() {
        let message = Message::from_line("b.txt", 3, "{\"nested\": true}");
        assert_eq!(
            message.to_payload().unwrap(),
            message.clone().into_envelope().to_payload().unwrap()
        );
    }

    #[test]
    fn test_envelope_parse_rejects_bare_message() {
        assert!(Envelope::parse(r#"{"File":"a","Row":1,"Data":"x"}"#).is_err());
    }

    #[test]
    fn test_delivery_outcome_display() {
        let ok = DeliveryOutcome::delivered("events", 2, 41);
        assert!(ok.is_delivered());
        assert_eq!(ok.to_string(), "delivered to events [2] at offset 41");

        let failed = DeliveryOutcome::failed("Message timed out");
        assert!(!failed.is_delivered());
        assert_eq!(failed.to_string(), "delivery failed: Message timed out");
    }

    #[test]
    fn test_parse_brokers() {
        assert_eq!(
            parse_brokers(" k1:9092, ,k2:9093,"),
            vec!["k1:9092".to_string(), "k2:9093".to_string()]
        );
        assert!(parse_brokers("").is_empty());
    }

    #[test]
    fn test_publisher_config_bootstrap_servers() {
        let config = PublisherConfig::new(parse_brokers("k1:9092,k2:9092"), "lines")
            .with_client_id("test-host");
        assert_eq!(config.bootstrap_servers(), "k1:9092,k2:9092");
        assert_eq!(config.client_id, "test-host");
        assert_eq!(config.delivery_timeout, DEFAULT_DELIVERY_TIMEOUT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_publisher_config_validation() {
        assert!(PublisherConfig::new(vec![], "lines").validate().is_err());
        assert!(PublisherConfig::new(vec!["localhost".into()], "lines")
            .validate()
            .is_err());
        assert!(PublisherConfig::new(vec![":9092".into()], "lines")
            .validate()
            .is_err());
        assert!(PublisherConfig::new(vec!["localhost:port".into()], "lines")
            .validate()
            .is_err());
        assert!(PublisherConfig::new(vec!["localhost:9092".into()], "")
            .validate()
            .is_err());
        assert!(PublisherConfig::new(vec!["localhost:9092".into()], "bad topic")
            .validate()
            .is_err());
        assert!(PublisherConfig::new(vec!["localhost:9092".into()], "..")
            .validate()
            .is_err());
        assert!(PublisherConfig::new(vec!["localhost:9092".into()], "lines")
            .with_delivery_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(PublisherConfig::new(vec!["localhost:9092".into()], "lines")
            .with_delivery_timeout(Duration::from_micros(500))
            .validate()
            .is_err());
        assert!(PublisherConfig::new(vec!["localhost:9092".into()], "lines")
            .with_delivery_timeout(Duration::from_millis(i32::MAX as u64 + 1))
            .validate()
            .is_err());
        assert!(PublisherConfig::new(vec!["localhost:9092".into()], "lines")
            .with_delivery_timeout(Duration::from_millis(1))
            .validate()
            .is_ok());
        assert!(PublisherConfig::new(vec!["[::1]:9092".into()], "auth.file-data_v1")
            .validate()
            .is_ok());
    }
}
