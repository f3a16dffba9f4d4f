//! Keyword discovery for property include files.
//!
//! A property file names its data with a keyword line near the top, possibly
//! preceded by comments and `ECHO`/`NOECHO` control lines. The scanner looks
//! at a bounded window of lines so very large property files cost the same
//! as small ones.
use crate::grdecl::starts_with_letter;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Number of leading lines searched for a keyword.
pub const KEYWORD_WINDOW_LINES: usize = 20;

/// Longest line, `\n` excluded, read while searching for a keyword.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// How much of the matched line becomes the keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeywordPolicy {
    /// The whole line, minus its line terminator.
    #[default]
    WholeLine,
    /// Only the first whitespace-delimited token.
    FirstToken,
}

impl KeywordPolicy {
    fn apply(self, line: &str) -> String {
        match self {
            KeywordPolicy::WholeLine => line.to_string(),
            KeywordPolicy::FirstToken => line
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Scanning { lines_seen: usize },
    Found(String),
    Exhausted,
}

/// Line-at-a-time keyword recognizer.
#[derive(Debug)]
pub struct KeywordScanner {
    policy: KeywordPolicy,
    state: ScanState,
}

impl KeywordScanner {
    pub fn new(policy: KeywordPolicy) -> Self {
        Self {
            policy,
            state: ScanState::Scanning { lines_seen: 0 },
        }
    }

    /// Advance by one line. Lines fed after a terminal state are ignored.
    pub fn feed(&mut self, line: &str) -> &ScanState {
        if let ScanState::Scanning { lines_seen } = self.state {
            let lines_seen = lines_seen + 1;
            let line = strip_line_terminator(line);
            self.state = if !line.contains("ECHO") && starts_with_letter(line) {
                ScanState::Found(self.policy.apply(line))
            } else if lines_seen >= KEYWORD_WINDOW_LINES {
                ScanState::Exhausted
            } else {
                ScanState::Scanning { lines_seen }
            };
        }
        &self.state
    }

    pub fn is_done(&self) -> bool {
        !matches!(self.state, ScanState::Scanning { .. })
    }

    /// The keyword, or an empty string when none was found.
    pub fn finish(self) -> String {
        match self.state {
            ScanState::Found(keyword) => keyword,
            ScanState::Scanning { .. } | ScanState::Exhausted => String::new(),
        }
    }
}

fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Result of scanning one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordScan {
    /// Possibly empty.
    Keyword(String),
    /// The scanned window is not UTF-8 text.
    NotText,
    /// A line in the window is longer than `MAX_LINE_BYTES`. `line` is 1-based.
    LineTooLong { line: usize },
}

/// Recover the keyword of a property file from its first lines.
pub fn read_keyword(path: &Path, policy: KeywordPolicy) -> io::Result<KeywordScan> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut scanner = KeywordScanner::new(policy);
    let mut buf = Vec::new();
    let mut line_number = 0;

    while !scanner.is_done() {
        buf.clear();
        let read = (&mut reader)
            .take(MAX_LINE_BYTES as u64 + 1)
            .read_until(b'\n', &mut buf)?;
        if read == 0 {
            break;
        }
        line_number += 1;
        let content_len = buf.len() - usize::from(buf.last() == Some(&b'\n'));
        if content_len > MAX_LINE_BYTES {
            return Ok(KeywordScan::LineTooLong { line: line_number });
        }
        let Ok(line) = std::str::from_utf8(&buf) else {
            return Ok(KeywordScan::NotText);
        };
        tracing::trace!(line = line.trim_end(), "scan");
        scanner.feed(line);
    }

    Ok(KeywordScan::Keyword(scanner.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(lines: &[&str], policy: KeywordPolicy) -> String {
        let mut scanner = KeywordScanner::new(policy);
        for line in lines {
            scanner.feed(line);
        }
        scanner.finish()
    }

    fn write_temp(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        std::io::Write::write_all(&mut file, contents).expect("write temp file");
        file
    }

    #[test]
    fn echo_lines_are_skipped() {
        let lines = ["ECHO\n", "NOECHO\n", "-- comment\n", "PORO\n", "0.1 /\n"];
        assert_eq!(scan(&lines, KeywordPolicy::WholeLine), "PORO");
    }

    #[test]
    fn keyword_on_last_line_of_window_is_found() {
        let mut lines = vec!["-- filler\n"; KEYWORD_WINDOW_LINES - 1];
        lines.push("PERMX\n");
        assert_eq!(scan(&lines, KeywordPolicy::WholeLine), "PERMX");
    }

    #[test]
    fn keyword_past_window_is_ignored() {
        let mut scanner = KeywordScanner::new(KeywordPolicy::WholeLine);
        for _ in 0..KEYWORD_WINDOW_LINES {
            scanner.feed("   1.0 2.0\n");
        }
        assert!(scanner.is_done());
        assert_eq!(scanner.feed("PORO\n"), &ScanState::Exhausted);
        assert_eq!(scanner.finish(), "");
    }

    #[test]
    fn echo_lines_count_toward_window() {
        let mut lines = vec!["ECHO\n"; KEYWORD_WINDOW_LINES];
        lines.push("PORO\n");
        assert_eq!(scan(&lines, KeywordPolicy::WholeLine), "");
    }

    #[test]
    fn whole_line_policy_keeps_line_verbatim() {
        let lines = ["PORO  -- porosity \r\n"];
        assert_eq!(
            scan(&lines, KeywordPolicy::WholeLine),
            "PORO  -- porosity "
        );
    }

    #[test]
    fn first_token_policy_keeps_keyword_only() {
        let lines = ["PORO  -- porosity \r\n"];
        assert_eq!(scan(&lines, KeywordPolicy::FirstToken), "PORO");
    }

    #[test]
    fn indented_line_is_not_a_keyword() {
        let lines = ["  PORO\n"];
        assert_eq!(scan(&lines, KeywordPolicy::WholeLine), "");
    }

    #[test]
    fn reads_keyword_from_file_and_ignores_tail() {
        let mut contents = String::from("-- exported\nECHO\nFIPNUM\n");
        for _ in 0..1000 {
            contents.push_str("1 2 3 4\n");
        }
        contents.push_str("/\n");
        let file = write_temp(contents.as_bytes());
        let scan = read_keyword(file.path(), KeywordPolicy::WholeLine).expect("scan");
        assert_eq!(scan, KeywordScan::Keyword("FIPNUM".to_string()));
    }

    #[test]
    fn binary_content_is_not_text() {
        let file = write_temp(&[0xff, 0xfe, 0x00, b'\n', b'P']);
        let scan = read_keyword(file.path(), KeywordPolicy::WholeLine).expect("scan");
        assert_eq!(scan, KeywordScan::NotText);
    }

    #[test]
    fn empty_file_has_empty_keyword() {
        let file = write_temp(b"");
        let scan = read_keyword(file.path(), KeywordPolicy::WholeLine).expect("scan");
        assert_eq!(scan, KeywordScan::Keyword(String::new()));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = read_keyword(&dir.path().join("nope.grdecl"), KeywordPolicy::WholeLine)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn line_at_length_limit_is_accepted() {
        let mut contents = vec![b'-'; MAX_LINE_BYTES];
        contents.extend_from_slice(b"\nPORO\n");
        let file = write_temp(&contents);
        let scan = read_keyword(file.path(), KeywordPolicy::WholeLine).expect("scan");
        assert_eq!(scan, KeywordScan::Keyword("PORO".to_string()));

        let last = write_temp(&vec![b'-'; MAX_LINE_BYTES]);
        let scan = read_keyword(last.path(), KeywordPolicy::WholeLine).expect("scan");
        assert_eq!(scan, KeywordScan::Keyword(String::new()));
    }

    #[test]
    fn overlong_line_is_reported_with_its_number() {
        let contents = format!("-- header\nPORO{} /\n", " 0.1".repeat(MAX_LINE_BYTES / 4));
        let file = write_temp(contents.as_bytes());
        let scan = read_keyword(file.path(), KeywordPolicy::WholeLine).expect("scan");
        assert_eq!(scan, KeywordScan::LineTooLong { line: 2 });
    }
}
