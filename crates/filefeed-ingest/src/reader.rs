//! Line reading for flat files and the manifest

use crate::error::{IngestError, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, error};

/// Collect the non-empty trimmed lines of `reader` in order.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so one
/// bad character never costs the rest of the file. An I/O error part way
/// through is logged and ends the scan; the lines read before it are
/// returned.
pub async fn scan_lines<R>(mut reader: R, source: &Path) -> Vec<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut collected = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim();
                if !line.is_empty() {
                    collected.push(line.to_string());
                }
            },
            Err(e) => {
                error!(
                    path = %source.display(),
                    lines_read = collected.len(),
                    error = %e,
                    "Error scanning file"
                );
                break;
            },
        }
    }

    collected
}

/// Read the non-empty trimmed lines of the file at `path`, in file order.
///
/// Failing to open the file is an error; failing part way through is not.
pub async fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .await
        .map_err(|e| IngestError::file_unavailable(path, e))?;

    let lines = scan_lines(BufReader::new(file), path).await;
    debug!(path = %path.display(), lines = lines.len(), "Read file");
    Ok(lines)
}
