//! Reference editing session.
//!
//! [`EditSession`] bundles a [`TextBuffer`], its [`DisplayLayout`] and a [`MarkerLayer`], and
//! implements [`Session`] on top of them. It is the host used by the tests and benchmarks; an
//! embedding editor can implement [`Session`] for its own document model instead.
//!
//! Edits return the marker signals they caused. Delivering them to the owning cursors is the
//! caller's job (see [`Cursor::handle_marker_signals`](crate::Cursor::handle_marker_signals)).

use crate::buffer::TextBuffer;
use crate::error::CursorError;
use crate::layout::{DEFAULT_TAB_WIDTH, DisplayLayout};
use crate::marker::{Marker, MarkerLayer};
use crate::position::{Position, Range};
use crate::session::{
    ClipDirection, CursorId, MarkerChange, MarkerId, MarkerSignal, ScanControl, ScanMatch,
    Session, TextSource,
};
use regex::Regex;
use std::borrow::Cow;
use tracing::trace;

/// Text, layout, markers and the cursor registry of one document.
#[derive(Debug)]
pub struct EditSession {
    buffer: TextBuffer,
    layout: DisplayLayout,
    markers: MarkerLayer,
    cursors: Vec<(CursorId, MarkerId)>,
    next_cursor_id: u64,
}

impl EditSession {
    /// Create a session over `text` with the default tab width and no soft wrap.
    pub fn new(text: &str) -> Self {
        Self::with_layout(text, DEFAULT_TAB_WIDTH, None)
    }

    /// Create a session with an explicit tab width and soft wrap column.
    pub fn with_layout(text: &str, tab_width: usize, wrap_width: Option<usize>) -> Self {
        let buffer = TextBuffer::new(text);
        let mut layout = DisplayLayout::new(tab_width, wrap_width);
        layout.rebuild(&buffer);
        Self {
            buffer,
            layout,
            markers: MarkerLayer::new(),
            cursors: Vec::new(),
            next_cursor_id: 0,
        }
    }

    /// The underlying text.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// The screen layout.
    pub fn layout(&self) -> &DisplayLayout {
        &self.layout
    }

    /// Full document text.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Number of live markers.
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Ids of the registered cursors, oldest first.
    pub fn cursor_ids(&self) -> impl Iterator<Item = CursorId> + '_ {
        self.cursors.iter().map(|&(id, _)| id)
    }

    /// Change the tab width used for screen coordinates.
    pub fn set_tab_width(&mut self, tab_width: usize) {
        self.layout.set_tab_width(tab_width);
        self.layout.rebuild(&self.buffer);
    }

    /// Turn soft wrap on (`Some(column)`) or off (`None`).
    ///
    /// Markers keep their buffer positions; their screen positions follow the new layout.
    pub fn set_soft_wrap(&mut self, wrap_width: Option<usize>) {
        self.layout.set_wrap_width(wrap_width);
        self.layout.rebuild(&self.buffer);
    }

    /// Insert text and return the signals of every marker it moved.
    pub fn insert(&mut self, position: Position, text: &str) -> Vec<(MarkerId, MarkerSignal)> {
        self.replace(Range::empty_at(position), text)
    }

    /// Delete a range and return the signals of every marker it moved.
    pub fn delete(&mut self, range: Range) -> Vec<(MarkerId, MarkerSignal)> {
        self.replace(range, "")
    }

    /// Replace a range and return the signals of every marker it moved on screen or in the
    /// buffer. Every signal carries `text_changed = true`.
    pub fn replace(&mut self, range: Range, text: &str) -> Vec<(MarkerId, MarkerSignal)> {
        let before: Vec<(MarkerId, Marker, Position)> = self
            .markers
            .iter()
            .map(|(id, marker)| (id, marker, self.buffer_to_screen(marker.head)))
            .collect();

        let change = self.buffer.replace(range, text);
        if change.is_empty() {
            return Vec::new();
        }
        self.layout.rebuild(&self.buffer);
        let moved = self.markers.apply_change(&change);
        trace!(
            old_range = %change.old_range,
            new_range = %change.new_range,
            moved = moved.len(),
            "text replaced"
        );

        // Markers the edit did not move can still shift on screen when rows above them rewrap.
        let mut signals = Vec::new();
        for (id, old, old_head_screen_position) in before {
            let new = match moved.binary_search_by_key(&id, |&(moved_id, _, _)| moved_id) {
                Ok(index) => moved[index].2,
                Err(_) => old,
            };
            let new_head_screen_position = self.buffer_to_screen(new.head);
            if old == new && old_head_screen_position == new_head_screen_position {
                continue;
            }
            signals.push((
                id,
                MarkerSignal::Changed(MarkerChange {
                    old_head_buffer_position: old.head,
                    new_head_buffer_position: new.head,
                    old_head_screen_position,
                    new_head_screen_position,
                    old_tail_buffer_position: old.tail,
                    new_tail_buffer_position: new.tail,
                    text_changed: true,
                }),
            ));
        }
        signals
    }

    fn explicit_change(&self, old: Marker, new: Marker) -> Option<MarkerChange> {
        if old == new {
            return None;
        }
        Some(MarkerChange {
            old_head_buffer_position: old.head,
            new_head_buffer_position: new.head,
            old_head_screen_position: self.buffer_to_screen(old.head),
            new_head_screen_position: self.buffer_to_screen(new.head),
            old_tail_buffer_position: old.tail,
            new_tail_buffer_position: new.tail,
            text_changed: false,
        })
    }

    fn marker(&self, id: MarkerId) -> Result<Marker, CursorError> {
        self.markers.get(id).ok_or(CursorError::UnknownMarker(id))
    }
}

impl TextSource for EditSession {
    fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    fn line_text(&self, row: usize) -> Option<Cow<'_, str>> {
        self.buffer.line_text(row)
    }

    fn end_of_buffer(&self) -> Position {
        self.buffer.end_of_buffer()
    }

    fn text_in_range(&self, range: Range) -> String {
        self.buffer.text_in_range(range)
    }

    fn clip_buffer_position(&self, position: Position) -> Position {
        self.buffer.clip_buffer_position(position)
    }

    fn scan_forward(
        &self,
        regex: &Regex,
        range: Range,
        visit: &mut dyn FnMut(&ScanMatch<'_>) -> ScanControl,
    ) {
        self.buffer.scan_forward(regex, range, visit);
    }

    fn scan_backward(
        &self,
        regex: &Regex,
        range: Range,
        visit: &mut dyn FnMut(&ScanMatch<'_>) -> ScanControl,
    ) {
        self.buffer.scan_backward(regex, range, visit);
    }
}

impl Session for EditSession {
    fn buffer_to_screen(&self, position: Position) -> Position {
        self.layout.buffer_to_screen(&self.buffer, position)
    }

    fn screen_to_buffer(&self, position: Position, clip: ClipDirection) -> Position {
        self.layout.screen_to_buffer(&self.buffer, position, clip)
    }

    fn screen_line_count(&self) -> usize {
        self.layout.screen_row_count()
    }

    fn screen_line_length(&self, row: usize) -> usize {
        self.layout.screen_row(row).map_or(0, |segment| segment.width)
    }

    fn create_marker(&mut self, position: Position) -> MarkerId {
        let position = self.buffer.clip_buffer_position(position);
        self.markers.create(position)
    }

    fn marker_head(&self, marker: MarkerId) -> Option<Position> {
        self.markers.get(marker).map(|m| m.head)
    }

    fn marker_buffer_range(&self, marker: MarkerId) -> Option<Range> {
        self.markers.get(marker).map(|m| m.range())
    }

    fn set_marker_head_buffer_position(
        &mut self,
        marker: MarkerId,
        position: Position,
    ) -> Result<Option<MarkerChange>, CursorError> {
        let position = self.buffer.clip_buffer_position(position);
        let old = self.markers.set_head(marker, position)?;
        let new = self.marker(marker)?;
        Ok(self.explicit_change(old, new))
    }

    fn set_marker_tail_buffer_position(
        &mut self,
        marker: MarkerId,
        position: Position,
    ) -> Result<Option<MarkerChange>, CursorError> {
        let position = self.buffer.clip_buffer_position(position);
        let old = self.markers.set_tail(marker, position)?;
        let new = self.marker(marker)?;
        Ok(self.explicit_change(old, new))
    }

    fn clear_marker_tail(&mut self, marker: MarkerId) -> Result<Option<MarkerChange>, CursorError> {
        let old = self.markers.clear_tail(marker)?;
        let new = self.marker(marker)?;
        Ok(self.explicit_change(old, new))
    }

    fn destroy_marker(&mut self, marker: MarkerId) -> bool {
        self.markers.destroy(marker)
    }

    fn register_cursor(&mut self, marker: MarkerId) -> CursorId {
        let id = CursorId(self.next_cursor_id);
        self.next_cursor_id += 1;
        self.cursors.push((id, marker));
        id
    }

    fn is_last_cursor(&self, cursor: CursorId) -> bool {
        self.cursors.last().is_some_and(|&(id, _)| id == cursor)
    }

    fn remove_cursor(&mut self, cursor: CursorId) {
        self.cursors.retain(|&(id, _)| id != cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(signal: &MarkerSignal) -> MarkerChange {
        match signal {
            MarkerSignal::Changed(change) => *change,
            MarkerSignal::Destroyed => panic!("expected a change"),
        }
    }

    #[test]
    fn test_marker_writes_report_changes() {
        let mut session = EditSession::new("hello\nworld");
        let marker = session.create_marker(Position::new(0, 1));

        let change = session
            .set_marker_head_buffer_position(marker, Position::new(1, 99))
            .unwrap()
            .unwrap();
        assert_eq!(change.old_head_buffer_position, Position::new(0, 1));
        assert_eq!(change.new_head_buffer_position, Position::new(1, 5));
        assert!(!change.text_changed);

        // Writing the same position reports nothing.
        assert!(
            session
                .set_marker_head_buffer_position(marker, Position::new(1, 5))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_unknown_marker_is_an_error() {
        let mut session = EditSession::new("x");
        let marker = session.create_marker(Position::zero());
        assert!(session.destroy_marker(marker));
        assert!(!session.destroy_marker(marker));
        assert!(matches!(
            session.clear_marker_tail(marker),
            Err(CursorError::UnknownMarker(_))
        ));
    }

    #[test]
    fn test_edits_emit_text_changed_signals() {
        let mut session = EditSession::new("abc def");
        let before = session.create_marker(Position::new(0, 1));
        let after = session.create_marker(Position::new(0, 5));

        let signals = session.insert(Position::new(0, 3), "XY");
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].0, after);
        let change = changed(&signals[0].1);
        assert!(change.text_changed);
        assert_eq!(change.new_head_buffer_position, Position::new(0, 7));
        assert_eq!(session.marker_head(before), Some(Position::new(0, 1)));
    }

    #[test]
    fn test_edit_that_rewraps_reports_screen_only_moves() {
        let mut session = EditSession::with_layout("abcdefgh\nxyz", 4, Some(4));
        let marker = session.create_marker(Position::new(0, 6));
        assert_eq!(session.buffer_to_screen(Position::new(0, 6)), Position::new(1, 2));

        // Deleting on row 0 after the marker leaves its buffer position alone.
        let signals = session.delete(Range::new((0, 7), (0, 8)));
        assert!(signals.is_empty());

        // Inserting before the marker moves it in both coordinate spaces.
        let signals = session.insert(Position::new(0, 0), "__");
        let change = changed(&signals[0].1);
        assert_eq!(signals[0].0, marker);
        assert_eq!(change.new_head_screen_position, Position::new(2, 0));
    }

    #[test]
    fn test_rewrap_above_reports_screen_only_move() {
        let mut session = EditSession::with_layout("ab\nxyz", 4, Some(4));
        let marker = session.create_marker(Position::new(1, 1));
        assert_eq!(session.buffer_to_screen(Position::new(1, 1)), Position::new(1, 1));

        let signals = session.insert(Position::new(0, 2), "cde");
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].0, marker);
        let change = changed(&signals[0].1);
        assert_eq!(change.old_head_buffer_position, change.new_head_buffer_position);
        assert_eq!(change.old_head_screen_position, Position::new(1, 1));
        assert_eq!(change.new_head_screen_position, Position::new(2, 1));
    }

    #[test]
    fn test_empty_edit_reports_nothing() {
        let mut session = EditSession::new("abc");
        session.create_marker(Position::new(0, 1));
        assert!(session.insert(Position::new(0, 0), "").is_empty());
        assert!(session.delete(Range::empty_at(Position::new(0, 2))).is_empty());
    }

    #[test]
    fn test_last_cursor_tracking() {
        let mut session = EditSession::new("");
        let m1 = session.create_marker(Position::zero());
        let m2 = session.create_marker(Position::zero());
        let c1 = session.register_cursor(m1);
        let c2 = session.register_cursor(m2);

        assert!(!session.is_last_cursor(c1));
        assert!(session.is_last_cursor(c2));

        session.remove_cursor(c2);
        assert!(session.is_last_cursor(c1));
        assert_eq!(session.cursor_ids().collect::<Vec<_>>(), vec![c1]);
    }

    #[test]
    fn test_screen_lines() {
        let session = EditSession::with_layout("\tab\nlonger line", 4, Some(6));
        assert_eq!(session.screen_line_count(), 3);
        assert_eq!(session.screen_line_length(0), 6);
        assert_eq!(session.screen_line_length(1), 6);
        assert_eq!(session.screen_line_length(2), 5);
        assert_eq!(session.screen_line_length(9), 0);
    }
}
