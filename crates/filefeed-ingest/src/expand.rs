//! Path pattern expansion
//!
//! A pattern is a glob whose directory part must already exist, e.g.
//! `/data/incoming/auth_*.txt`. Patterns pointing at a missing directory are
//! skipped, never escalated.

use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// A directory-qualified glob expression taken from the manifest
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern(String);

impl PathPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory component of the pattern; `.` for a bare file name
    pub fn directory(&self) -> &Path {
        Path::new(&self.0)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PathPattern {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

impl From<String> for PathPattern {
    fn from(pattern: String) -> Self {
        Self(pattern)
    }
}

/// Why a pattern produced no files to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The directory component does not exist or cannot be inspected
    MissingDirectory(PathBuf),
    /// The directory component exists but is not a directory
    NotADirectory(PathBuf),
    /// The glob syntax is invalid
    InvalidPattern(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingDirectory(dir) => write!(f, "invalid path '{}'", dir.display()),
            SkipReason::NotADirectory(dir) => write!(f, "'{}' is not a directory", dir.display()),
            SkipReason::InvalidPattern(msg) => write!(f, "invalid pattern: {}", msg),
        }
    }
}

/// Result of expanding one pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    Skipped(SkipReason),
    /// Regular files matching the pattern, possibly none
    Matched(Vec<PathBuf>),
}

/// Check the pattern's directory, then expand it into concrete files.
pub async fn expand(pattern: &PathPattern) -> Expansion {
    let dir = pattern.directory();

    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {},
        Ok(_) => {
            error!(directory = %dir.display(), "Invalid path: not a directory");
            return Expansion::Skipped(SkipReason::NotADirectory(dir.to_path_buf()));
        },
        Err(e) => {
            error!(directory = %dir.display(), error = %e, "Invalid path");
            return Expansion::Skipped(SkipReason::MissingDirectory(dir.to_path_buf()));
        },
    }

    // glob walks the directory synchronously
    let owned = pattern.clone();
    match tokio::task::spawn_blocking(move || glob_files(&owned)).await {
        Ok(expansion) => expansion,
        Err(e) => {
            error!(error = %e, "Pattern expansion task failed");
            Expansion::Skipped(SkipReason::InvalidPattern(e.to_string()))
        },
    }
}

fn glob_files(pattern: &PathPattern) -> Expansion {
    let paths = match glob::glob(pattern.as_str()) {
        Ok(paths) => paths,
        Err(e) => {
            error!(error = %e, "Invalid path pattern");
            return Expansion::Skipped(SkipReason::InvalidPattern(e.to_string()));
        },
    };

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(path) => debug!(path = %path.display(), "Ignoring match that is not a regular file"),
            Err(e) => warn!(path = %e.path().display(), error = %e.error(), "Unreadable match"),
        }
    }

    Expansion::Matched(files)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn pattern_in(dir: &TempDir, glob: &str) -> PathPattern {
        PathPattern::new(dir.path().join(glob).to_string_lossy().to_string())
    }

    #[test]
    fn test_directory_component() {
        assert_eq!(PathPattern::from("/data/a*.txt").directory(), Path::new("/data"));
        assert_eq!(PathPattern::from("/a*.txt").directory(), Path::new("/"));
        assert_eq!(PathPattern::from("a*.txt").directory(), Path::new("."));
        assert_eq!(PathPattern::from("in/*.log").directory(), Path::new("in"));
    }

    #[tokio::test]
    async fn test_expand_matches_only_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a1.txt"), "x\n").unwrap();
        fs::write(dir.path().join("a2.txt"), "y\n").unwrap();
        fs::write(dir.path().join("b1.txt"), "z\n").unwrap();
        fs::create_dir(dir.path().join("a3.txt")).unwrap();

        let Expansion::Matched(mut files) = expand(&pattern_in(&dir, "a*.txt")).await else {
            panic!("expected matches");
        };
        files.sort();

        assert_eq!(files, vec![dir.path().join("a1.txt"), dir.path().join("a2.txt")]);
    }

    #[tokio::test]
    async fn test_expand_no_matches_is_not_a_skip() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            expand(&pattern_in(&dir, "*.csv")).await,
            Expansion::Matched(Vec::new())
        );
    }

    #[tokio::test]
    async fn test_expand_missing_directory_is_skipped() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let pattern = PathPattern::new(missing.join("*.txt").to_string_lossy().to_string());

        assert_eq!(
            expand(&pattern).await,
            Expansion::Skipped(SkipReason::MissingDirectory(missing))
        );
    }

    #[tokio::test]
    async fn test_expand_file_as_directory_is_skipped() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, "").unwrap();
        let pattern = PathPattern::new(file.join("*.txt").to_string_lossy().to_string());

        assert_eq!(
            expand(&pattern).await,
            Expansion::Skipped(SkipReason::NotADirectory(file))
        );
    }

    #[tokio::test]
    async fn test_expand_invalid_glob_is_skipped() {
        let dir = TempDir::new().unwrap();
        let result = expand(&pattern_in(&dir, "a[*.txt")).await;
        assert!(matches!(result, Expansion::Skipped(SkipReason::InvalidPattern(_))));
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::MissingDirectory(PathBuf::from("/data"));
        assert_eq!(reason.to_string(), "invalid path '/data'");
    }
}
