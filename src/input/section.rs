use std::io::{self, BufRead};
use tracing::{debug, warn};

use super::LineReader;

/// Where a section search left the reader.
#[derive(Debug, PartialEq, Eq)]
pub struct SectionStart {
    pub found: bool,
    /// First data row after the marker and its header, if any.
    pub first_line: Option<String>,
}

/// Advances `lines` past the `marker` line and its column header.
///
/// Never rewinds: a marker that appeared before the current position is not
/// found. When the marker is missing the stream is left exhausted and the
/// returned start is empty.
pub fn seek_section<R: BufRead>(
    lines: &mut LineReader<R>,
    marker: &str,
) -> io::Result<SectionStart> {
    let mut found = false;

    while let Some(line) = lines.next_line()? {
        if line == marker {
            found = true;
            // column header
            lines.next_line()?;
            break;
        }
    }

    if found {
        debug!(section = marker, line = lines.line_number(), "Section located");
    } else {
        warn!(section = marker, "Section not found in source");
    }

    Ok(SectionStart {
        found,
        first_line: lines.next_line()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(text: &str) -> LineReader<Cursor<String>> {
        LineReader::new(Cursor::new(text.to_string()))
    }

    #[test]
    fn test_skips_header_and_returns_first_row() {
        let mut lines = reader("junk\nNOTES\nid;course;grade\n1;Math;12\n");
        let start = seek_section(&mut lines, "NOTES").unwrap();
        assert!(start.found);
        assert_eq!(start.first_line.as_deref(), Some("1;Math;12"));
    }

    #[test]
    fn test_marker_must_match_exactly() {
        let mut lines = reader("NOTES:\nheader\nrow\n");
        let start = seek_section(&mut lines, "NOTES").unwrap();
        assert!(!start.found);
        assert_eq!(start.first_line, None);
    }

    #[test]
    fn test_section_without_rows() {
        let mut lines = reader("MATIERES\nnom;coef\n\nNOTES\n");
        let start = seek_section(&mut lines, "MATIERES").unwrap();
        assert!(start.found);
        assert_eq!(start.first_line.as_deref(), Some(""));
    }

    #[test]
    fn test_never_backtracks() {
        let mut lines = reader("NOTES\nh\n1;A;2\nETUDIANTS\nh\n1;a;b;3\n");
        assert!(seek_section(&mut lines, "ETUDIANTS").unwrap().found);
        let notes = seek_section(&mut lines, "NOTES").unwrap();
        assert!(!notes.found);
        assert_eq!(notes.first_line, None);
    }
}
