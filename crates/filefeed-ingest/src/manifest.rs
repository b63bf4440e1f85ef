//! Manifest handling
//!
//! A manifest is a plain text file listing one path pattern per line:
//!
//! ```text
//! /data/auth/a*.txt
//! /data/auth/archive/2024-*.dat
//! ```
//!
//! Blank lines are ignored and surrounding whitespace is trimmed.

use crate::error::{IngestError, Result};
use crate::expand::PathPattern;
use crate::reader::scan_lines;
use std::path::Path;
use tokio::fs::File;
use tokio::io::BufReader;
use tracing::info;

/// Load the path patterns listed in the manifest at `path`, in order.
///
/// The run cannot continue without a manifest, so failing to open it is
/// returned as [`IngestError::ManifestUnavailable`].
pub async fn read_manifest(path: impl AsRef<Path>) -> Result<Vec<PathPattern>> {
    let path = path.as_ref();
    let file = File::open(path)
        .await
        .map_err(|e| IngestError::manifest_unavailable(path, e))?;

    let patterns: Vec<PathPattern> = scan_lines(BufReader::new(file), path)
        .await
        .into_iter()
        .map(PathPattern::from)
        .collect();

    info!(manifest = %path.display(), patterns = patterns.len(), "Loaded manifest");
    Ok(patterns)
}
