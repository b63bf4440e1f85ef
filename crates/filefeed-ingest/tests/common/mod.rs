//! Shared helpers for pipeline tests

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use filefeed_common::types::{DeliveryOutcome, Envelope, Message};
use filefeed_ingest::Publisher;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

type Hook = Box<dyn Fn(&Message) + Send + Sync>;
type Predicate = Box<dyn Fn(&Message) -> bool + Send + Sync>;

/// In-memory publisher that records every payload it is handed
pub struct RecordingPublisher {
    topic: String,
    payloads: Mutex<Vec<String>>,
    next_offset: AtomicI64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
    fail_when: Option<Predicate>,
    on_publish: Option<Hook>,
}

impl RecordingPublisher {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            payloads: Mutex::new(Vec::new()),
            next_offset: AtomicI64::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: None,
            fail_when: None,
            on_publish: None,
        }
    }

    /// Report a broker failure for messages matching `predicate`
    pub fn fail_when(mut self, predicate: impl Fn(&Message) -> bool + Send + Sync + 'static) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    /// Run `hook` before each message is acknowledged
    pub fn on_publish(mut self, hook: impl Fn(&Message) + Send + Sync + 'static) -> Self {
        self.on_publish = Some(Box::new(hook));
        self
    }

    /// Hold every publish open for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.payloads()
            .iter()
            .map(|p| Envelope::parse(p).unwrap().into_message())
            .collect()
    }

    /// Messages from one source file, in publish order
    pub fn messages_from(&self, file: &str) -> Vec<Message> {
        self.messages().into_iter().filter(|m| m.file == file).collect()
    }

    /// Highest number of publishes that were awaiting acknowledgment at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, message: &Message) -> DeliveryOutcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.payloads
            .lock()
            .unwrap()
            .push(message.to_payload().unwrap());

        if let Some(hook) = &self.on_publish {
            hook(message);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_when.as_ref().is_some_and(|fail| fail(message)) {
            return DeliveryOutcome::failed("Broker: simulated delivery failure");
        }

        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        DeliveryOutcome::delivered(&self.topic, 0, offset)
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}

/// A temporary directory of input files plus a manifest describing them
pub struct Fixture {
    pub root: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Create `relative` (and its parent directories) with `content`
    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Absolute pattern string for a glob relative to the fixture root
    pub fn pattern(&self, relative: &str) -> String {
        self.path(relative).to_string_lossy().to_string()
    }

    /// Write a manifest listing `patterns` (blank entries become blank lines)
    pub fn manifest(&self, patterns: &[String]) -> PathBuf {
        let path = self.path("manifest.txt");
        std::fs::write(&path, patterns.join("\n")).unwrap();
        path
    }
}

pub fn remove(path: &Path) {
    std::fs::remove_file(path).unwrap();
}
