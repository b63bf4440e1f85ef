//! Progress bar for running workers

use indicatif::{ProgressBar, ProgressStyle};

/// Create a bar counting finished workers; hidden when `enabled` is false
pub fn create_worker_progress(total: usize, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} patterns")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_progress_length() {
        let pb = create_worker_progress(3, true);
        assert_eq!(pb.length(), Some(3));
        pb.inc(3);
        assert_eq!(pb.position(), 3);
        pb.finish_and_clear();
    }

    #[test]
    fn test_disabled_progress_is_hidden() {
        let pb = create_worker_progress(3, false);
        assert!(pb.is_hidden());
    }
}
