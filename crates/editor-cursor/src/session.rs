//! Collaborator contracts.
//!
//! The cursor does not own text. Everything it needs from the surrounding editing session is
//! expressed by two traits:
//!
//! - [`TextSource`]: line access and regex scanning over buffer coordinates. This is all the
//!   boundary scanner needs.
//! - [`Session`]: a [`TextSource`] that also converts between buffer and screen coordinates,
//!   stores markers, and keeps the list of cursors.
//!
//! A session is passed to cursor operations as `&mut S` instead of being stored inside the
//! cursor, so there is no reference cycle between the two.

use crate::error::CursorError;
use crate::position::{Position, Range};
use regex::Regex;
use std::borrow::Cow;

/// Identifier of a marker owned by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

/// Identifier of a cursor registered with a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CursorId(pub u64);

/// A single regex match reported by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanMatch<'a> {
    /// Buffer range of the match (clipped to the scanned range).
    pub range: Range,
    /// Matched text.
    pub text: &'a str,
}

/// Returned by scan visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanControl {
    /// Keep visiting matches.
    Continue,
    /// Halt the scan.
    Stop,
}

/// How a screen position that falls inside a multi-cell character (or past a row end) is
/// resolved to a valid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipDirection {
    /// Toward the start of the document.
    Backward,
    /// Whichever valid position is nearer.
    #[default]
    Closest,
    /// Toward the end of the document.
    Forward,
}

/// Description of a marker update, delivered synchronously by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerChange {
    /// Head buffer position before the change.
    pub old_head_buffer_position: Position,
    /// Head buffer position after the change.
    pub new_head_buffer_position: Position,
    /// Head screen position before the change.
    pub old_head_screen_position: Position,
    /// Head screen position after the change.
    pub new_head_screen_position: Position,
    /// Tail buffer position before the change (`None` for an empty marker).
    pub old_tail_buffer_position: Option<Position>,
    /// Tail buffer position after the change (`None` for an empty marker).
    pub new_tail_buffer_position: Option<Position>,
    /// `true` if the change was caused by a text edit rather than an explicit move.
    pub text_changed: bool,
}

impl MarkerChange {
    /// Returns `true` if the head moved on screen.
    pub fn head_moved(&self) -> bool {
        self.old_head_screen_position != self.new_head_screen_position
    }

    /// Buffer range of the marker after the change.
    pub fn new_buffer_range(&self) -> Range {
        let head = self.new_head_buffer_position;
        Range::new(head, self.new_tail_buffer_position.unwrap_or(head))
    }
}

/// Signals a marker raises toward the cursor that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSignal {
    /// The marker moved or its range changed.
    Changed(MarkerChange),
    /// The marker was destroyed.
    Destroyed,
}

/// Read access to document text in buffer coordinates.
pub trait TextSource {
    /// Number of buffer rows (at least 1).
    fn line_count(&self) -> usize;

    /// Text of a buffer row without its line terminator.
    fn line_text(&self, row: usize) -> Option<Cow<'_, str>>;

    /// Position just past the last character.
    fn end_of_buffer(&self) -> Position;

    /// Text within `range` (rows joined with `'\n'`).
    fn text_in_range(&self, range: Range) -> String;

    /// Clamp a position onto the buffer.
    fn clip_buffer_position(&self, position: Position) -> Position;

    /// Visit matches of `regex` inside `range` from start to end.
    ///
    /// Anchors see the surrounding document; a match crossing `range.end` is clipped to it.
    fn scan_forward(
        &self,
        regex: &Regex,
        range: Range,
        visit: &mut dyn FnMut(&ScanMatch<'_>) -> ScanControl,
    );

    /// Visit the same matches as [`scan_forward`](Self::scan_forward), last to first.
    fn scan_backward(
        &self,
        regex: &Regex,
        range: Range,
        visit: &mut dyn FnMut(&ScanMatch<'_>) -> ScanControl,
    );

    /// Returns `true` if the row is empty or holds only spaces and tabs.
    fn is_row_blank(&self, row: usize) -> bool {
        self.line_text(row)
            .is_none_or(|text| text.chars().all(|ch| ch == ' ' || ch == '\t'))
    }

    /// Nearest row above `row` that is not blank.
    fn previous_non_blank_row(&self, row: usize) -> Option<usize> {
        (0..row.min(self.line_count())).rev().find(|&r| !self.is_row_blank(r))
    }
}

/// Everything a cursor consumes from its editing session.
pub trait Session: TextSource {
    /// Convert a buffer position to screen coordinates.
    fn buffer_to_screen(&self, position: Position) -> Position;

    /// Convert a screen position to buffer coordinates.
    fn screen_to_buffer(&self, position: Position, clip: ClipDirection) -> Position;

    /// Number of screen rows.
    fn screen_line_count(&self) -> usize;

    /// Width of a screen row, in cells.
    fn screen_line_length(&self, row: usize) -> usize;

    /// Create an empty marker at a buffer position.
    fn create_marker(&mut self, position: Position) -> MarkerId;

    /// Head buffer position of a marker.
    fn marker_head(&self, marker: MarkerId) -> Option<Position>;

    /// Buffer range spanned by a marker (empty unless it has a tail).
    fn marker_buffer_range(&self, marker: MarkerId) -> Option<Range>;

    /// Screen range spanned by a marker.
    fn marker_screen_range(&self, marker: MarkerId) -> Option<Range> {
        self.marker_buffer_range(marker).map(|range| {
            Range::new(
                self.buffer_to_screen(range.start),
                self.buffer_to_screen(range.end),
            )
        })
    }

    /// Move a marker's head to a buffer position. Returns the change, or `None` if nothing moved.
    fn set_marker_head_buffer_position(
        &mut self,
        marker: MarkerId,
        position: Position,
    ) -> Result<Option<MarkerChange>, CursorError>;

    /// Move a marker's head to a screen position.
    fn set_marker_head_screen_position(
        &mut self,
        marker: MarkerId,
        position: Position,
        clip: ClipDirection,
    ) -> Result<Option<MarkerChange>, CursorError> {
        let buffer_position = self.screen_to_buffer(position, clip);
        self.set_marker_head_buffer_position(marker, buffer_position)
    }

    /// Anchor a marker's tail (turning it into a range).
    fn set_marker_tail_buffer_position(
        &mut self,
        marker: MarkerId,
        position: Position,
    ) -> Result<Option<MarkerChange>, CursorError>;

    /// Collapse a marker onto its head.
    fn clear_marker_tail(&mut self, marker: MarkerId) -> Result<Option<MarkerChange>, CursorError>;

    /// Destroy a marker. Returns `false` if it was already gone.
    fn destroy_marker(&mut self, marker: MarkerId) -> bool;

    /// Register a cursor backed by `marker`. The newest cursor is the "last" cursor.
    fn register_cursor(&mut self, marker: MarkerId) -> CursorId;

    /// Returns `true` if `cursor` is the most recently added live cursor.
    fn is_last_cursor(&self, cursor: CursorId) -> bool;

    /// Forget a cursor.
    fn remove_cursor(&mut self, cursor: CursorId);
}
