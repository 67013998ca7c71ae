//! Word boundary scanning.
//!
//! Every query takes a buffer position and scans the [`TextSource`] with a word pattern (see
//! [`WordClassifier`](crate::WordClassifier)) until a match satisfies the query's acceptance rule.
//! Backward scans start at the beginning of the nearest non-blank row above the position. Forward
//! scans start with the position's row and double the number of rows they cover until the query
//! is answered or the buffer ends, so a match never spans two windows. A query that finds nothing
//! returns the position it was given.

use crate::position::{Position, Range};
use crate::session::{ScanControl, ScanMatch, TextSource};
use regex::Regex;

/// Options accepted by the word queries on [`Cursor`](crate::Cursor).
#[derive(Debug, Clone, Copy)]
pub struct WordOptions<'a> {
    /// Pattern to use instead of the configured word pattern.
    pub word_regex: Option<&'a Regex>,
    /// Whether runs of non-word characters count as words.
    pub include_non_word_characters: bool,
    /// Beginning-of-word: accept words that end before the position.
    pub allow_previous: bool,
    /// End-of-word: accept words that start after the position.
    pub allow_next: bool,
}

impl Default for WordOptions<'_> {
    fn default() -> Self {
        Self {
            word_regex: None,
            include_non_word_characters: true,
            allow_previous: true,
            allow_next: true,
        }
    }
}

/// Boundary queries over a text source with a fixed word pattern.
pub struct BoundaryScanner<'a, T: TextSource + ?Sized> {
    text: &'a T,
    regex: &'a Regex,
}

impl<'a, T: TextSource + ?Sized> BoundaryScanner<'a, T> {
    /// Create a scanner.
    pub fn new(text: &'a T, regex: &'a Regex) -> Self {
        Self { text, regex }
    }

    fn backward_range(&self, position: Position) -> Range {
        let start_row = self.text.previous_non_blank_row(position.row).unwrap_or(0);
        Range::new(Position::new(start_row, 0), position)
    }

    /// Scan forward from `position` to the end of the buffer, one growing window at a time.
    fn scan_forward_from(
        &self,
        position: Position,
        visit: &mut dyn FnMut(&ScanMatch<'_>) -> ScanControl,
    ) {
        let end = self.text.end_of_buffer();
        let mut from = self.text.clip_buffer_position(position);
        let mut rows = 1;
        loop {
            let last_row = from.row.saturating_add(rows - 1);
            let window_end = if last_row >= end.row {
                end
            } else {
                self.text
                    .clip_buffer_position(Position::new(last_row, Position::END_OF_ROW))
            };

            let mut stopped = false;
            self.text
                .scan_forward(self.regex, Range::new(from, window_end), &mut |m| {
                    let control = visit(m);
                    stopped = control == ScanControl::Stop;
                    control
                });
            if stopped || window_end == end {
                return;
            }
            from = Position::new(last_row + 1, 0);
            rows *= 2;
        }
    }

    /// Start of the word at or before `position`.
    ///
    /// A match is accepted if it reaches `position`, or always when `allow_previous` is set.
    /// Accepted matches starting exactly at `position` do not end the scan.
    pub fn beginning_of_current_word(&self, position: Position, allow_previous: bool) -> Position {
        let mut found = None;
        self.text
            .scan_backward(self.regex, self.backward_range(position), &mut |m| {
                if m.range.end >= position || allow_previous {
                    found = Some(m.range.start);
                    if m.range.start != position {
                        return ScanControl::Stop;
                    }
                }
                ScanControl::Continue
            });
        found.unwrap_or(position)
    }

    /// End of the word at or after `position`. Mirror of
    /// [`beginning_of_current_word`](Self::beginning_of_current_word).
    pub fn end_of_current_word(&self, position: Position, allow_next: bool) -> Position {
        let mut found = None;
        self.scan_forward_from(position, &mut |m| {
            if m.range.start <= position || allow_next {
                found = Some(m.range.end);
                if m.range.end != position {
                    return ScanControl::Stop;
                }
            }
            ScanControl::Continue
        });
        found.unwrap_or(position)
    }

    /// Returns `true` if the first match at or after `position` starts exactly there.
    pub fn is_inside_word(&self, position: Position) -> bool {
        let mut first = None;
        self.scan_forward_from(position, &mut |m| {
            first = Some(m.range.start);
            ScanControl::Stop
        });
        first == Some(position)
    }

    /// Start of the next word. Skips the rest of the current word first.
    pub fn beginning_of_next_word(&self, position: Position) -> Position {
        let start = if self.is_inside_word(position) {
            self.end_of_current_word(position, true)
        } else {
            position
        };

        let mut found = None;
        self.scan_forward_from(start, &mut |m| {
            found = Some(m.range.start);
            ScanControl::Stop
        });
        found.unwrap_or(position)
    }

    /// Closest word boundary before `position`. Never crosses the start of the current row
    /// unless the position is already at column 0.
    pub fn previous_word_boundary(&self, position: Position) -> Position {
        let mut found = None;
        self.text
            .scan_backward(self.regex, self.backward_range(position), &mut |m| {
                let candidate = if m.range.start.row < position.row && position.column > 0 {
                    Position::new(position.row, 0)
                } else if m.range.end < position {
                    m.range.end
                } else {
                    m.range.start
                };
                found = Some(candidate);
                if candidate != position {
                    ScanControl::Stop
                } else {
                    ScanControl::Continue
                }
            });
        found.unwrap_or(position)
    }

    /// Closest word boundary after `position`. A match on a later row stops at that row's
    /// column 0.
    pub fn next_word_boundary(&self, position: Position) -> Position {
        let mut found = None;
        self.scan_forward_from(position, &mut |m| {
            let candidate = if m.range.start.row > position.row {
                Position::new(m.range.start.row, 0)
            } else if m.range.start > position {
                m.range.start
            } else {
                m.range.end
            };
            found = Some(candidate);
            if candidate != position {
                ScanControl::Stop
            } else {
                ScanControl::Continue
            }
        });
        found.unwrap_or(position)
    }

    /// The tightest word range around `position`, never borrowing from neighbouring words.
    pub fn current_word_range(&self, position: Position) -> Range {
        Range::new(
            self.beginning_of_current_word(position, false),
            self.end_of_current_word(position, false),
        )
    }
}
