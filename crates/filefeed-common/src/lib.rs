//! filefeed Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging and error handling for the filefeed workspace.
//!
//! - **Error Handling**: [`FeedError`] and the [`Result`] alias
//! - **Types**: messages, envelopes, delivery outcomes and publisher settings
//! - **Logging**: `tracing` subscriber setup
//!
//! # Example
//!
//! ```
//! use filefeed_common::types::{Envelope, Message};
//!
//! # fn main() -> filefeed_common::Result<()> {
//! let payload = Message::from_line("a1.txt", 1, "x").into_envelope().to_payload()?;
//! assert_eq!(payload, r#"{"Record":{"File":"a1.txt","Row":1,"Data":"x"}}"#);
//! assert_eq!(Envelope::parse(&payload)?.record.data, "x");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod logging;
pub mod types;

pub use error::{FeedError, Result};
pub use types::{DeliveryOutcome, Envelope, Message, PublisherConfig};
