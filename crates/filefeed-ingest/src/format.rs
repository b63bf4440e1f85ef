//! Line to message formatting

use filefeed_common::types::Message;
use std::path::Path;

/// Name recorded as a message's `File`: the base name of `path`
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Turn the lines of one file into messages numbered `1..=lines.len()`.
pub fn format_lines(path: &Path, lines: Vec<String>) -> impl Iterator<Item = Message> {
    let file = source_name(path);
    lines
        .into_iter()
        .zip(1u64..)
        .map(move |(line, row)| Message::from_line(file.clone(), row, line))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use filefeed_common::types::Envelope;

    #[test]
    fn test_source_name() {
        assert_eq!(source_name(Path::new("/data/a1.txt")), "a1.txt");
        assert_eq!(source_name(Path::new("a1.txt")), "a1.txt");
        assert_eq!(source_name(Path::new("/")), "/");
    }

    #[test]
    fn test_rows_follow_file_order() {
        let lines: Vec<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
        let messages: Vec<Message> = format_lines(Path::new("/data/a1.txt"), lines).collect();

        assert_eq!(messages.len(), 3);
        for (i, message) in messages.iter().enumerate() {
            assert_eq!(message.file, "a1.txt");
            assert_eq!(message.row, i as u64 + 1);
        }
        assert_eq!(messages[2].data, "z");
    }

    #[test]
    fn test_no_lines_no_messages() {
        assert_eq!(format_lines(Path::new("/data/empty.txt"), Vec::new()).count(), 0);
    }

    #[test]
    fn test_formatted_lines_round_trip() {
        let lines = vec![
            r#"id="42",name="O'Brien""#.to_string(),
            "tab\there\u{7f}bell\u{07}".to_string(),
            r"C:\path\to\file".to_string(),
        ];

        for message in format_lines(Path::new("/in/q.txt"), lines.clone()) {
            let payload = message.to_payload().unwrap();
            let parsed = Envelope::parse(&payload).unwrap().into_message();
            assert_eq!(parsed, message);
            assert_eq!(parsed.data, lines[parsed.row as usize - 1]);
        }
    }
}
