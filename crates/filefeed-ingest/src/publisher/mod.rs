//! Message publishing
//!
//! A [`Publisher`] sends one message at a time and resolves only once the
//! broker has acknowledged or rejected it. Workers never have more than one
//! message in flight, so when a worker finishes every message it sent has a
//! known fate.

pub mod kafka;

use async_trait::async_trait;
use filefeed_common::types::{DeliveryOutcome, Message};

pub use kafka::KafkaPublisher;

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `message` wrapped in its envelope and wait for the delivery report.
    ///
    /// Never fails outright: a rejected delivery is a
    /// [`DeliveryOutcome::Failed`] for the caller to log.
    async fn publish(&self, message: &Message) -> DeliveryOutcome;

    /// Topic messages are published to
    fn topic(&self) -> &str;
}
