//! Marker layer.
//!
//! A marker is a head position with an optional tail. Markers live in buffer coordinates and are
//! remapped through every [`TextChange`] so they keep pointing at the same text.

use crate::delta::TextChange;
use crate::error::CursorError;
use crate::position::{Position, Range};
use crate::session::MarkerId;
use std::collections::BTreeMap;

/// Buffer state of one marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    /// Moving end.
    pub head: Position,
    /// Anchored end, if the marker spans a range.
    pub tail: Option<Position>,
}

impl Marker {
    /// Range between head and tail (empty without a tail).
    pub fn range(&self) -> Range {
        Range::new(self.head, self.tail.unwrap_or(self.head))
    }
}

/// Markers that moved during an edit, as `(id, before, after)`.
pub type RemappedMarkers = Vec<(MarkerId, Marker, Marker)>;

/// All markers of a session.
#[derive(Debug, Default)]
pub struct MarkerLayer {
    markers: BTreeMap<MarkerId, Marker>,
    next_id: u64,
}

impl MarkerLayer {
    /// Create an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns `true` if the layer holds no markers.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Create an empty marker at `position`.
    pub fn create(&mut self, position: Position) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.markers.insert(
            id,
            Marker {
                head: position,
                tail: None,
            },
        );
        id
    }

    /// Current state of a marker.
    pub fn get(&self, id: MarkerId) -> Option<Marker> {
        self.markers.get(&id).copied()
    }

    /// Iterate over all markers in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (MarkerId, Marker)> + '_ {
        self.markers.iter().map(|(&id, &marker)| (id, marker))
    }

    /// Move the head. Returns the state before the move.
    pub fn set_head(&mut self, id: MarkerId, position: Position) -> Result<Marker, CursorError> {
        let marker = self
            .markers
            .get_mut(&id)
            .ok_or(CursorError::UnknownMarker(id))?;
        let before = *marker;
        marker.head = position;
        Ok(before)
    }

    /// Anchor the tail. Returns the state before the change.
    pub fn set_tail(&mut self, id: MarkerId, position: Position) -> Result<Marker, CursorError> {
        let marker = self
            .markers
            .get_mut(&id)
            .ok_or(CursorError::UnknownMarker(id))?;
        let before = *marker;
        marker.tail = Some(position);
        Ok(before)
    }

    /// Drop the tail. Returns the state before the change.
    pub fn clear_tail(&mut self, id: MarkerId) -> Result<Marker, CursorError> {
        let marker = self
            .markers
            .get_mut(&id)
            .ok_or(CursorError::UnknownMarker(id))?;
        let before = *marker;
        marker.tail = None;
        Ok(before)
    }

    /// Remove a marker. Returns `false` if it did not exist.
    pub fn destroy(&mut self, id: MarkerId) -> bool {
        self.markers.remove(&id).is_some()
    }

    /// Remap every marker through `change`.
    pub fn apply_change(&mut self, change: &TextChange) -> RemappedMarkers {
        let mut moved = Vec::new();
        for (&id, marker) in self.markers.iter_mut() {
            let before = *marker;
            marker.head = change.map_position(marker.head);
            marker.tail = marker.tail.map(|tail| change.map_position(tail));
            if *marker != before {
                moved.push((id, before, *marker));
            }
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;

    #[test]
    fn test_create_and_move() {
        let mut layer = MarkerLayer::new();
        let id = layer.create(Position::new(0, 1));
        assert_eq!(layer.len(), 1);

        let before = layer.set_head(id, Position::new(0, 3)).unwrap();
        assert_eq!(before.head, Position::new(0, 1));
        layer.set_tail(id, Position::new(0, 0)).unwrap();
        assert_eq!(layer.get(id).unwrap().range(), Range::new((0, 0), (0, 3)));

        layer.clear_tail(id).unwrap();
        assert!(layer.get(id).unwrap().range().is_empty());
    }

    #[test]
    fn test_unknown_marker() {
        let mut layer = MarkerLayer::new();
        let id = layer.create(Position::zero());
        assert!(layer.destroy(id));
        assert!(!layer.destroy(id));
        assert!(matches!(
            layer.set_head(id, Position::zero()),
            Err(CursorError::UnknownMarker(missing)) if missing == id
        ));
    }

    #[test]
    fn test_apply_change_reports_only_moved_markers() {
        let mut buffer = TextBuffer::new("hello world");
        let mut layer = MarkerLayer::new();
        let before_edit = layer.create(Position::new(0, 2));
        let after_edit = layer.create(Position::new(0, 8));

        let change = buffer.insert(Position::new(0, 5), ",");
        let moved = layer.apply_change(&change);

        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].0, after_edit);
        assert_eq!(layer.get(after_edit).unwrap().head, Position::new(0, 9));
        assert_eq!(layer.get(before_edit).unwrap().head, Position::new(0, 2));
    }

    #[test]
    fn test_deletion_collapses_markers_inside() {
        let mut buffer = TextBuffer::new("abc\ndef\nghi");
        let mut layer = MarkerLayer::new();
        let id = layer.create(Position::new(1, 1));
        layer.set_tail(id, Position::new(2, 2)).unwrap();

        let change = buffer.delete(Range::new((0, 2), (1, 2)));
        layer.apply_change(&change);

        let marker = layer.get(id).unwrap();
        assert_eq!(marker.head, Position::new(0, 2));
        assert_eq!(marker.tail, Some(Position::new(1, 2)));
    }
}
