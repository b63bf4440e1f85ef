//! Per-pattern worker
//!
//! A worker walks one pattern end to end:
//!
//! ```text
//! Spawned -> ExpandingPaths -> Skipped
//!                           -> ReadingFile -> Formatting -> Publishing -> (next line / file)
//!                                                                      -> Done
//!                           -> Aborted (a matched file could not be opened)
//! ```
//!
//! Publishing is strictly sequential inside a worker: the next message is not
//! submitted until the previous one has a delivery outcome.

use crate::error::Result;
use crate::expand::{expand, Expansion, PathPattern, SkipReason};
use crate::format::format_lines;
use crate::publisher::Publisher;
use crate::reader::read_lines;
use filefeed_common::types::DeliveryOutcome;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Spawned,
    ExpandingPaths,
    Skipped,
    ReadingFile,
    Formatting,
    Publishing,
    Aborted,
    Done,
}

impl WorkerState {
    /// Whether the worker has finished
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkerState::Skipped | WorkerState::Aborted | WorkerState::Done)
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkerState::Spawned => "spawned",
            WorkerState::ExpandingPaths => "expanding_paths",
            WorkerState::Skipped => "skipped",
            WorkerState::ReadingFile => "reading_file",
            WorkerState::Formatting => "formatting",
            WorkerState::Publishing => "publishing",
            WorkerState::Aborted => "aborted",
            WorkerState::Done => "done",
        };
        f.write_str(name)
    }
}

/// What a worker hands back when it finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub pattern: PathPattern,

    /// Terminal state: `Done`, `Skipped` or `Aborted`
    pub state: WorkerState,

    /// Files read to the end (or to their first scan error)
    pub files: usize,

    /// Non-empty lines read across those files
    pub lines: usize,

    pub delivered: usize,

    pub failed: usize,

    pub skip_reason: Option<SkipReason>,

    /// The error that aborted the worker
    pub error: Option<String>,
}

impl WorkerReport {
    fn new(pattern: PathPattern) -> Self {
        Self {
            pattern,
            state: WorkerState::Spawned,
            files: 0,
            lines: 0,
            delivered: 0,
            failed: 0,
            skip_reason: None,
            error: None,
        }
    }

    /// Messages handed to the publisher
    pub fn published(&self) -> usize {
        self.delivered + self.failed
    }
}

pub struct Worker {
    publisher: Arc<dyn Publisher>,
    report: WorkerReport,
}

impl Worker {
    pub fn new(pattern: PathPattern, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            publisher,
            report: WorkerReport::new(pattern),
        }
    }

    fn enter(&mut self, next: WorkerState) {
        trace!(from = %self.report.state, to = %next, "Worker state change");
        self.report.state = next;
    }

    /// Process the whole pattern and report how it went
    pub async fn run(mut self) -> WorkerReport {
        info!("Processing path");
        self.enter(WorkerState::ExpandingPaths);

        let files = match expand(&self.report.pattern).await {
            Expansion::Skipped(reason) => {
                self.report.skip_reason = Some(reason);
                self.enter(WorkerState::Skipped);
                return self.report;
            },
            Expansion::Matched(files) => files,
        };

        debug!(files = files.len(), "Pattern expanded");

        for path in &files {
            if let Err(e) = self.process_file(path).await {
                error!(path = %path.display(), error = %e, "Aborting worker");
                self.report.error = Some(e.to_string());
                self.enter(WorkerState::Aborted);
                return self.report;
            }
        }

        self.enter(WorkerState::Done);
        info!(
            files = self.report.files,
            delivered = self.report.delivered,
            failed = self.report.failed,
            "Finished path"
        );
        self.report
    }

    async fn process_file(&mut self, path: &Path) -> Result<()> {
        self.enter(WorkerState::ReadingFile);
        info!(path = %path.display(), "Reading file");

        let lines = read_lines(path).await?;
        self.report.files += 1;
        self.report.lines += lines.len();

        let mut messages = format_lines(path, lines);
        loop {
            self.enter(WorkerState::Formatting);
            let Some(message) = messages.next() else {
                break;
            };

            self.enter(WorkerState::Publishing);

            match self.publisher.publish(&message).await {
                DeliveryOutcome::Delivered {
                    topic,
                    partition,
                    offset,
                } => {
                    self.report.delivered += 1;
                    debug!(
                        record = %message,
                        topic = %topic,
                        partition,
                        offset,
                        "Delivered message"
                    );
                },
                DeliveryOutcome::Failed { reason } => {
                    self.report.failed += 1;
                    error!(record = %message, reason = %reason, "Delivery failed");
                },
            }
        }

        Ok(())
    }
}
