//! filefeed Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Publishes the lines of flat files to Kafka, one message per line.
//!
//! A manifest lists path patterns such as `/data/auth/a*.txt`. Each pattern
//! gets its own concurrent worker, which expands the pattern, reads every
//! matched file and publishes each non-empty line as
//! `{"Record":{"File":"a1.txt","Row":1,"Data":"..."}}`, waiting for the
//! broker's acknowledgment before sending the next one.
//!
//! # Example
//!
//! ```no_run
//! use filefeed_common::types::PublisherConfig;
//! use filefeed_ingest::{pipeline, IngestConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let publisher = PublisherConfig::new(vec!["localhost:9092".into()], "auth-file-data");
//!     let config = IngestConfig::new("paths.txt", publisher);
//!
//!     let report = pipeline::run(&config).await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod expand;
pub mod format;
pub mod manifest;
pub mod pipeline;
pub mod progress;
pub mod publisher;
pub mod reader;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use expand::PathPattern;
pub use pipeline::{Pipeline, PipelineReport};
pub use publisher::Publisher;
