//! Structured text changes.
//!
//! Every edit applied to a [`TextBuffer`](crate::TextBuffer) is described by a [`TextChange`]
//! in buffer coordinates, so marker layers can remap themselves without diffing old and new text.

use crate::position::{Position, Range};

/// A single replacement expressed in buffer coordinates.
///
/// Semantics:
/// - `old_range` is the replaced range in the document **before** the edit.
/// - `new_range` is the range covered by `new_text` **after** the edit.
/// - Both ranges share the same start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    /// Replaced range before the edit.
    pub old_range: Range,
    /// Inserted range after the edit.
    pub new_range: Range,
    /// Exact deleted text (may be empty).
    pub old_text: String,
    /// Exact inserted text (may be empty).
    pub new_text: String,
}

impl TextChange {
    /// Returns `true` if the change neither deleted nor inserted anything.
    pub fn is_empty(&self) -> bool {
        self.old_text.is_empty() && self.new_text.is_empty()
    }

    /// Map a pre-edit position to its post-edit location.
    ///
    /// Positions before the edit are untouched. Positions at the edit start stay put when text is
    /// only deleted and follow the inserted text otherwise. Positions inside the replaced range
    /// collapse onto the end of the inserted text; positions after it shift.
    pub fn map_position(&self, position: Position) -> Position {
        let old = self.old_range;
        if position < old.start {
            return position;
        }
        if position == old.start && self.new_text.is_empty() {
            return position;
        }
        if position <= old.end {
            return self.new_range.end;
        }

        if position.row == old.end.row {
            Position::new(
                self.new_range.end.row,
                self.new_range.end.column + (position.column - old.end.column),
            )
        } else {
            let row_delta = self.new_range.end.row as isize - old.end.row as isize;
            Position::new((position.row as isize + row_delta) as usize, position.column)
        }
    }
}

/// Extent of `text` when inserted at `start`.
pub(crate) fn end_of_inserted_text(start: Position, text: &str) -> Position {
    let mut rows = text.split('\n');
    let first = rows.next().unwrap_or_default();
    let mut end = Position::new(start.row, start.column + first.chars().count());
    for row in rows {
        end = Position::new(end.row + 1, row.chars().count());
    }
    end
}
