//! Pipeline coordination
//!
//! The coordinator spawns one worker task per manifest pattern into a
//! [`JoinSet`] and returns only after every one of them has been joined.
//! Workers share nothing but the publisher.

pub mod worker;

use crate::config::IngestConfig;
use crate::error::Result;
use crate::expand::PathPattern;
use crate::manifest::read_manifest;
use crate::progress::create_worker_progress;
use crate::publisher::{KafkaPublisher, Publisher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, warn, Instrument};

pub use worker::{Worker, WorkerReport, WorkerState};

/// How long to wait for the producer queue to drain after the last worker
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a whole run, one report per worker that finished
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub workers: Vec<WorkerReport>,

    /// Worker tasks that panicked and produced no report
    pub panicked: usize,
}

impl PipelineReport {
    /// Workers spawned, whether or not they produced a report
    pub fn spawned(&self) -> usize {
        self.workers.len() + self.panicked
    }

    pub fn delivered(&self) -> usize {
        self.workers.iter().map(|w| w.delivered).sum()
    }

    pub fn failed(&self) -> usize {
        self.workers.iter().map(|w| w.failed).sum()
    }

    pub fn files(&self) -> usize {
        self.workers.iter().map(|w| w.files).sum()
    }

    pub fn in_state(&self, state: WorkerState) -> usize {
        self.workers.iter().filter(|w| w.state == state).count()
    }

    /// Report for the worker that handled `pattern`
    pub fn for_pattern(&self, pattern: &str) -> Option<&WorkerReport> {
        self.workers.iter().find(|w| w.pattern.as_str() == pattern)
    }
}

impl std::fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} path(s): {} done, {} skipped, {} aborted; {} file(s), {} delivered, {} failed",
            self.spawned(),
            self.in_state(WorkerState::Done),
            self.in_state(WorkerState::Skipped),
            self.in_state(WorkerState::Aborted),
            self.files(),
            self.delivered(),
            self.failed()
        )?;

        if self.panicked > 0 {
            write!(f, ", {} panicked", self.panicked)?;
        }

        Ok(())
    }
}

/// Fans patterns out to concurrent workers
pub struct Pipeline {
    publisher: Arc<dyn Publisher>,
    max_workers: Option<usize>,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self {
            publisher,
            max_workers: None,
            show_progress: false,
        }
    }

    /// Bound how many workers run at once; `None` starts them all immediately
    pub fn with_max_workers(mut self, max_workers: Option<usize>) -> Self {
        self.max_workers = max_workers.filter(|n| *n > 0);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run one worker per pattern and wait for all of them
    pub async fn run(&self, patterns: Vec<PathPattern>) -> PipelineReport {
        let total = patterns.len();
        if total == 0 {
            warn!("Manifest lists no paths");
            return PipelineReport::default();
        }

        info!(
            paths = total,
            max_workers = ?self.max_workers,
            topic = %self.publisher.topic(),
            "Processing the following path(s)"
        );

        let progress = create_worker_progress(total, self.show_progress);
        let limiter = self.max_workers.map(|n| Arc::new(Semaphore::new(n)));
        let mut workers = JoinSet::new();

        for (index, pattern) in patterns.into_iter().enumerate() {
            let publisher = Arc::clone(&self.publisher);
            let limiter = limiter.clone();
            let span = info_span!("worker", id = index + 1, path = %pattern);

            workers.spawn(
                async move {
                    // Held until the worker returns
                    let _permit = match limiter {
                        Some(semaphore) => semaphore.acquire_owned().await.ok(),
                        None => None,
                    };
                    Worker::new(pattern, publisher).run().await
                }
                .instrument(span),
            );
        }

        let mut report = PipelineReport::default();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(worker) => report.workers.push(worker),
                Err(e) => {
                    error!(error = %e, "Worker task failed");
                    report.panicked += 1;
                },
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!(summary = %report, "Finished");
        report
    }
}

/// Read the manifest, connect to Kafka and publish every line.
///
/// Errors returned here are fatal: the manifest could not be opened or the
/// broker could not be reached. Everything narrower is in the report.
pub async fn run(config: &IngestConfig) -> Result<PipelineReport> {
    config.validate()?;

    let patterns = read_manifest(&config.manifest).await?;
    let publisher = Arc::new(KafkaPublisher::connect(config.publisher.clone()).await?);

    let report = Pipeline::new(publisher.clone())
        .with_max_workers(config.max_workers)
        .with_progress(config.show_progress)
        .run(patterns)
        .await;

    if let Err(e) = publisher.flush(FLUSH_TIMEOUT) {
        warn!(error = %e, "Producer did not drain cleanly");
    }

    Ok(report)
}

/// Like [`run`], with a publisher supplied by the caller.
///
/// `config` is validated as in [`run`], but the publisher is used as given.
pub async fn run_with_publisher(
    config: &IngestConfig,
    publisher: Arc<dyn Publisher>,
) -> Result<PipelineReport> {
    config.validate()?;

    let patterns = read_manifest(&config.manifest).await?;

    Ok(Pipeline::new(publisher)
        .with_max_workers(config.max_workers)
        .with_progress(config.show_progress)
        .run(patterns)
        .await)
}
