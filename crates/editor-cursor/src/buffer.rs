//! Rope-backed text buffer.
//!
//! Stores document text with LF line endings and answers the [`TextSource`] queries the cursor
//! needs. CRLF and lone CR are normalized to LF; other Unicode separators (form feed, NEL, U+2028,
//! U+2029) are ordinary characters within a row. Positions are `(row, column)` with columns counted in `char`s; out-of-range positions are
//! clamped rather than rejected.

use crate::delta::{TextChange, end_of_inserted_text};
use crate::position::{Position, Range};
use crate::session::{ScanControl, ScanMatch, TextSource};
use regex::Regex;
use ropey::Rope;
use std::borrow::Cow;

/// Text storage with row/column addressing.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
}

impl TextBuffer {
    /// Build a buffer from text. CRLF and CR line endings are normalized to LF.
    pub fn new(text: &str) -> Self {
        let normalized = normalize_line_endings(text);
        Self {
            rope: Rope::from_str(&normalized),
        }
    }

    /// Full document text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Total number of characters.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Length of a row in characters (excluding the line terminator).
    pub fn line_length(&self, row: usize) -> usize {
        if row >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(row);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// Convert a position to a character offset, clamping it first.
    pub fn position_to_char(&self, position: Position) -> usize {
        let position = self.clip_buffer_position(position);
        self.rope.line_to_char(position.row) + position.column
    }

    /// Insert text at a position.
    pub fn insert(&mut self, position: Position, text: &str) -> TextChange {
        self.replace(Range::empty_at(position), text)
    }

    /// Delete a range.
    pub fn delete(&mut self, range: Range) -> TextChange {
        self.replace(range, "")
    }

    /// Replace a range with new text.
    pub fn replace(&mut self, range: Range, text: &str) -> TextChange {
        let start = self.clip_buffer_position(range.start);
        let end = self.clip_buffer_position(range.end);
        let start_char = self.position_to_char(start);
        let end_char = self.position_to_char(end);
        let new_text = normalize_line_endings(text).into_owned();

        let old_text = self.rope.slice(start_char..end_char).to_string();
        self.rope.remove(start_char..end_char);
        self.rope.insert(start_char, &new_text);

        TextChange {
            old_range: Range::new(start, end),
            new_range: Range::new(start, end_of_inserted_text(start, &new_text)),
            old_text,
            new_text,
        }
    }

    fn scan_window(&self, range: Range) -> ScanWindow {
        let first_row = range.start.row;
        let last_row = range.end.row;
        let start_char = self.rope.line_to_char(first_row);
        let end_char = self.rope.line_to_char(last_row) + self.line_length(last_row);
        let text = self.rope.slice(start_char..end_char).to_string();

        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(at, _)| at + 1));
        ScanWindow {
            first_row,
            text,
            line_starts,
        }
    }

    /// Copy out the rows of `range` and locate its ends as byte offsets in the copy.
    fn prepare_scan(&self, range: Range) -> (ScanWindow, usize, usize) {
        let range = Range::new(
            self.clip_buffer_position(range.start),
            self.clip_buffer_position(range.end),
        );
        let window = self.scan_window(range);
        let start_byte = window.byte_of(range.start);
        let end_byte = window.byte_of(range.end);
        (window, start_byte, end_byte)
    }
}

/// Visit `(start_byte, end_byte)` matches between two window offsets in document order, clipped
/// to `end_byte`, until `visit` returns [`ScanControl::Stop`].
fn for_each_match(
    regex: &Regex,
    text: &str,
    start_byte: usize,
    end_byte: usize,
    mut visit: impl FnMut(usize, usize) -> ScanControl,
) {
    let mut at = start_byte;
    let mut last_end = None;
    while at <= end_byte {
        let Some(m) = regex.find_at(text, at) else {
            break;
        };
        if m.start() > end_byte || (m.start() == end_byte && !m.is_empty()) {
            break;
        }

        let mut control = ScanControl::Continue;
        if m.is_empty() {
            if last_end != Some(m.start()) {
                control = visit(m.start(), m.end());
            }
            match text[m.end()..].chars().next() {
                Some(ch) => at = m.end() + ch.len_utf8(),
                None => at = end_byte + 1,
            }
        } else {
            control = visit(m.start(), m.end().min(end_byte));
            at = m.end();
        }
        if control == ScanControl::Stop {
            break;
        }
        last_end = Some(m.end());
    }
}

impl TextSource for TextBuffer {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_text(&self, row: usize) -> Option<Cow<'_, str>> {
        if row >= self.rope.len_lines() {
            return None;
        }
        let start = self.rope.line_to_char(row);
        let text = self.rope.slice(start..start + self.line_length(row));
        Some(match text.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(text.to_string()),
        })
    }

    fn end_of_buffer(&self) -> Position {
        let last_row = self.rope.len_lines().saturating_sub(1);
        Position::new(last_row, self.line_length(last_row))
    }

    fn text_in_range(&self, range: Range) -> String {
        let start = self.position_to_char(range.start);
        let end = self.position_to_char(range.end);
        self.rope.slice(start..end).to_string()
    }

    fn clip_buffer_position(&self, position: Position) -> Position {
        let last_row = self.rope.len_lines().saturating_sub(1);
        if position.row > last_row {
            return self.end_of_buffer();
        }
        Position::new(position.row, position.column.min(self.line_length(position.row)))
    }

    fn scan_forward(
        &self,
        regex: &Regex,
        range: Range,
        visit: &mut dyn FnMut(&ScanMatch<'_>) -> ScanControl,
    ) {
        let (window, start_byte, end_byte) = self.prepare_scan(range);
        for_each_match(regex, &window.text, start_byte, end_byte, |start, end| {
            visit(&window.scan_match(start, end))
        });
    }

    fn scan_backward(
        &self,
        regex: &Regex,
        range: Range,
        visit: &mut dyn FnMut(&ScanMatch<'_>) -> ScanControl,
    ) {
        let (window, start_byte, end_byte) = self.prepare_scan(range);
        let mut found = Vec::new();
        for_each_match(regex, &window.text, start_byte, end_byte, |start, end| {
            found.push((start, end));
            ScanControl::Continue
        });
        for (start, end) in found.into_iter().rev() {
            if visit(&window.scan_match(start, end)) == ScanControl::Stop {
                break;
            }
        }
    }
}

/// Whole rows of text copied out for regex scanning, so anchors see real line boundaries.
struct ScanWindow {
    first_row: usize,
    text: String,
    line_starts: Vec<usize>,
}

impl ScanWindow {
    fn byte_of(&self, position: Position) -> usize {
        let index = position.row - self.first_row;
        let line_start = self.line_starts[index];
        let line_end = self
            .line_starts
            .get(index + 1)
            .map_or(self.text.len(), |next| next - 1);
        self.text[line_start..line_end]
            .char_indices()
            .nth(position.column)
            .map_or(line_end, |(offset, _)| line_start + offset)
    }

    fn position_of(&self, byte: usize) -> Position {
        let index = self.line_starts.partition_point(|&start| start <= byte) - 1;
        let line_start = self.line_starts[index];
        Position::new(
            self.first_row + index,
            self.text[line_start..byte].chars().count(),
        )
    }

    fn scan_match(&self, start: usize, end: usize) -> ScanMatch<'_> {
        ScanMatch {
            range: Range::new(self.position_of(start), self.position_of(end)),
            text: &self.text[start..end],
        }
    }
}

fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collect(buffer: &TextBuffer, pattern: &str, range: Range, backward: bool) -> Vec<Range> {
        let re = regex::RegexBuilder::new(pattern)
            .multi_line(true)
            .build()
            .unwrap();
        let mut out = Vec::new();
        let mut visit = |m: &ScanMatch<'_>| {
            out.push(m.range);
            ScanControl::Continue
        };
        if backward {
            buffer.scan_backward(&re, range, &mut visit);
        } else {
            buffer.scan_forward(&re, range, &mut visit);
        }
        out
    }

    #[test]
    fn test_lines_and_lengths() {
        let buffer = TextBuffer::new("Hello\r\nWorld\n");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line_text(0).as_deref(), Some("Hello"));
        assert_eq!(buffer.line_text(1).as_deref(), Some("World"));
        assert_eq!(buffer.line_text(2).as_deref(), Some(""));
        assert_eq!(buffer.line_text(3), None);
        assert_eq!(buffer.end_of_buffer(), Position::new(2, 0));
    }

    #[test]
    fn test_carriage_returns_break_lines() {
        let buffer = TextBuffer::new("a\rb\r\nc\r");
        assert_eq!(buffer.text(), "a\nb\nc\n");
        assert_eq!(buffer.line_count(), 4);
        assert_eq!(buffer.line_text(1).as_deref(), Some("b"));

        let mut buffer = TextBuffer::new("x");
        buffer.insert(Position::new(0, 1), "\ry");
        assert_eq!(buffer.line_text(1).as_deref(), Some("y"));
    }

    #[test]
    fn test_unicode_separators_stay_inside_rows() {
        let buffer = TextBuffer::new("a\u{000C}b\u{2028}c\u{2029}d\u{0085}e\u{000B}f");
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.line_length(0), 11);
        assert_eq!(buffer.end_of_buffer(), Position::new(0, 11));
        assert_eq!(buffer.clip_buffer_position(Position::new(1, 0)), Position::new(0, 11));

        let ranges = collect(&buffer, r"\w+", Range::new((0, 0), (0, 11)), false);
        assert_eq!(ranges.len(), 6);
        assert_eq!(ranges[5], Range::new((0, 10), (0, 11)));
        let backward = collect(&buffer, r"\w+", Range::new((0, 0), (0, 11)), true);
        assert_eq!(backward[0], Range::new((0, 10), (0, 11)));
    }

    #[test]
    fn test_clip_and_offsets() {
        let buffer = TextBuffer::new("abc\nde");
        assert_eq!(buffer.clip_buffer_position(Position::new(0, 10)), Position::new(0, 3));
        assert_eq!(buffer.clip_buffer_position(Position::new(7, 0)), Position::new(1, 2));
        assert_eq!(buffer.position_to_char(Position::new(1, 1)), 5);
        assert_eq!(buffer.text_in_range(Range::new((0, 1), (1, 1))), "bc\nd");
    }

    #[test]
    fn test_insert_and_delete_report_changes() {
        let mut buffer = TextBuffer::new("abc");
        let change = buffer.insert(Position::new(0, 1), "X\nY");
        assert_eq!(buffer.text(), "aX\nYbc");
        assert_eq!(change.new_range, Range::new((0, 1), (1, 1)));

        let change = buffer.delete(Range::new((0, 2), (1, 1)));
        assert_eq!(buffer.text(), "aXbc");
        assert_eq!(change.old_text, "\nY");
        assert!(change.new_range.is_empty());
    }

    #[test]
    fn test_scan_clips_to_range_end_but_keeps_anchor_context() {
        let buffer = TextBuffer::new("  foobar");
        let ranges = collect(&buffer, r"^[\t ]*$|\w+", Range::new((0, 0), (0, 4)), false);
        assert_eq!(ranges, vec![Range::new((0, 2), (0, 4))]);
    }

    #[test]
    fn test_scan_reports_empty_lines_once() {
        let buffer = TextBuffer::new("a\n\nb");
        let forward = collect(&buffer, r"^[\t ]*$|\w+", Range::new((0, 0), (2, 1)), false);
        assert_eq!(
            forward,
            vec![
                Range::new((0, 0), (0, 1)),
                Range::empty_at(Position::new(1, 0)),
                Range::new((2, 0), (2, 1)),
            ]
        );

        let backward = collect(&buffer, r"^[\t ]*$|\w+", Range::new((0, 0), (2, 1)), true);
        assert_eq!(backward, forward.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_scan_stops_when_visitor_asks() {
        let buffer = TextBuffer::new("a b c d");
        let re = Regex::new(r"\w").unwrap();
        let mut seen = 0;
        buffer.scan_forward(&re, Range::new((0, 0), (0, 7)), &mut |_| {
            seen += 1;
            if seen == 2 { ScanControl::Stop } else { ScanControl::Continue }
        });
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_scan_multibyte_columns() {
        let buffer = TextBuffer::new("é ü\nöö");
        let ranges = collect(&buffer, r"\w+", Range::new((0, 0), (1, 2)), false);
        assert_eq!(
            ranges,
            vec![
                Range::new((0, 0), (0, 1)),
                Range::new((0, 2), (0, 3)),
                Range::new((1, 0), (1, 2)),
            ]
        );
    }
}
