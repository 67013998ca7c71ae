//! Screen layout (tab expansion and soft wrapping).
//!
//! Maps buffer positions to screen positions and back. A screen row is one segment of a buffer
//! row; a screen column is the cell offset within that segment. Cell widths follow UAX #11 and
//! tabs advance to the next tab stop.

use crate::position::Position;
use crate::session::{ClipDirection, TextSource};
use unicode_width::UnicodeWidthChar;

/// Default tab width (in cells) used when a caller does not specify a tab width.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Calculate visual width of a character (based on UAX #11)
///
/// Return value:
/// - 1: Narrow character (ASCII, etc.)
/// - 2: Wide character (CJK, fullwidth, etc.)
/// - 0: Zero-width character (combining characters, etc.)
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Calculate visual width (in cells) for a character at a specific cell offset within the line.
///
/// For `'\t'`, width advances to the next tab stop based on `tab_width`.
pub fn cell_width_at(ch: char, cell_offset_in_line: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        tab_width - cell_offset_in_line % tab_width
    } else {
        char_width(ch)
    }
}

/// Calculate the visual cell offset from the start of the line to the given character column.
pub fn visual_x_for_column(line: &str, column: usize, tab_width: usize) -> usize {
    let mut x = 0usize;
    for ch in line.chars().take(column) {
        x = x.saturating_add(cell_width_at(ch, x, tab_width));
    }
    x
}

/// Character indices where a line wraps, given a width limit.
///
/// Double-width characters are never split; a tab that does not fit moves to the next row.
pub fn wrap_points(text: &str, wrap_width: usize, tab_width: usize) -> Vec<usize> {
    if wrap_width == 0 {
        return Vec::new();
    }

    let char_count = text.chars().count();
    let mut points = Vec::new();
    let mut x_in_segment = 0usize;
    let mut x_in_line = 0usize;

    for (index, ch) in text.chars().enumerate() {
        let width = cell_width_at(ch, x_in_line, tab_width);

        if x_in_segment > 0 && x_in_segment + width > wrap_width {
            points.push(index);
            x_in_segment = 0;
        }

        x_in_segment += width;
        x_in_line += width;

        if x_in_segment >= wrap_width && index + 1 < char_count {
            points.push(index + 1);
            x_in_segment = 0;
        }
    }

    points
}

/// One screen row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRow {
    /// Buffer row this segment belongs to.
    pub buffer_row: usize,
    /// First buffer column in the segment.
    pub start_column: usize,
    /// Buffer column just past the segment.
    pub end_column: usize,
    /// Cell offset of the segment start within the buffer row.
    pub start_x: usize,
    /// Width of the segment in cells.
    pub width: usize,
    /// `true` for the final segment of its buffer row.
    pub is_last_segment: bool,
}

/// Screen rows for a whole buffer.
#[derive(Debug, Clone)]
pub struct DisplayLayout {
    tab_width: usize,
    wrap_width: Option<usize>,
    rows: Vec<ScreenRow>,
    first_screen_row: Vec<usize>,
}

impl DisplayLayout {
    /// Create an empty layout. Call [`rebuild`](Self::rebuild) before use.
    pub fn new(tab_width: usize, wrap_width: Option<usize>) -> Self {
        Self {
            tab_width: tab_width.max(1),
            wrap_width,
            rows: Vec::new(),
            first_screen_row: Vec::new(),
        }
    }

    /// Tab width in cells.
    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Soft wrap column, if wrapping is on.
    pub fn wrap_width(&self) -> Option<usize> {
        self.wrap_width
    }

    /// Change the tab width. Takes effect on the next rebuild.
    pub fn set_tab_width(&mut self, tab_width: usize) {
        self.tab_width = tab_width.max(1);
    }

    /// Change the soft wrap column. Takes effect on the next rebuild.
    pub fn set_wrap_width(&mut self, wrap_width: Option<usize>) {
        self.wrap_width = wrap_width;
    }

    /// Recompute every screen row from `text`.
    pub fn rebuild<T: TextSource + ?Sized>(&mut self, text: &T) {
        self.rows.clear();
        self.first_screen_row.clear();

        for buffer_row in 0..text.line_count() {
            let line = text.line_text(buffer_row).unwrap_or_default();
            self.first_screen_row.push(self.rows.len());

            let mut breaks = match self.wrap_width {
                Some(width) => wrap_points(&line, width, self.tab_width),
                None => Vec::new(),
            };
            breaks.push(line.chars().count());

            let mut start_column = 0;
            for (index, &end_column) in breaks.iter().enumerate() {
                let start_x = visual_x_for_column(&line, start_column, self.tab_width);
                let end_x = visual_x_for_column(&line, end_column, self.tab_width);
                self.rows.push(ScreenRow {
                    buffer_row,
                    start_column,
                    end_column,
                    start_x,
                    width: end_x - start_x,
                    is_last_segment: index + 1 == breaks.len(),
                });
                start_column = end_column;
            }
        }
    }

    /// Number of screen rows.
    pub fn screen_row_count(&self) -> usize {
        self.rows.len()
    }

    /// Screen row by index.
    pub fn screen_row(&self, row: usize) -> Option<&ScreenRow> {
        self.rows.get(row)
    }

    /// Map a (clipped) buffer position to screen coordinates.
    pub fn buffer_to_screen<T: TextSource + ?Sized>(&self, text: &T, position: Position) -> Position {
        let position = text.clip_buffer_position(position);
        let Some(&first) = self.first_screen_row.get(position.row) else {
            return Position::zero();
        };

        let mut screen_row = first;
        while let Some(next) = self.rows.get(screen_row + 1) {
            if next.buffer_row != position.row || next.start_column > position.column {
                break;
            }
            screen_row += 1;
        }

        let segment = self.rows[screen_row];
        let line = text.line_text(position.row).unwrap_or_default();
        let x = visual_x_for_column(&line, position.column, self.tab_width);
        Position::new(screen_row, x - segment.start_x)
    }

    /// Map a screen position to a buffer position, resolving positions inside multi-cell
    /// characters with `clip`. Rows past the end map to the end of the buffer.
    pub fn screen_to_buffer<T: TextSource + ?Sized>(
        &self,
        text: &T,
        position: Position,
        clip: ClipDirection,
    ) -> Position {
        let Some(segment) = self.rows.get(position.row) else {
            return text.end_of_buffer();
        };

        let line = text.line_text(segment.buffer_row).unwrap_or_default();
        let target_x = segment.start_x.saturating_add(position.column);
        let mut x = segment.start_x;

        let chars = line
            .chars()
            .enumerate()
            .skip(segment.start_column)
            .take(segment.end_column - segment.start_column);
        for (column, ch) in chars {
            if target_x == x {
                return Position::new(segment.buffer_row, column);
            }
            let width = cell_width_at(ch, x, self.tab_width);
            if target_x < x + width {
                let after = match clip {
                    ClipDirection::Backward => false,
                    ClipDirection::Forward => true,
                    ClipDirection::Closest => (target_x - x) * 2 >= width,
                };
                let column = if after { column + 1 } else { column };
                return Position::new(segment.buffer_row, column);
            }
            x += width;
        }

        let column = if !segment.is_last_segment
            && clip == ClipDirection::Backward
            && segment.end_column > segment.start_column
        {
            segment.end_column - 1
        } else {
            segment.end_column
        };
        Position::new(segment.buffer_row, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;

    fn layout(text: &TextBuffer, tab_width: usize, wrap: Option<usize>) -> DisplayLayout {
        let mut layout = DisplayLayout::new(tab_width, wrap);
        layout.rebuild(text);
        layout
    }

    #[test]
    fn test_char_width() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width('中'), 2);
        assert_eq!(char_width('\u{301}'), 0);
    }

    #[test]
    fn test_wrap_points() {
        assert_eq!(wrap_points("abcdefghij", 5, 4), vec![5]);
        assert_eq!(wrap_points("abcdefghijk", 5, 4), vec![5, 10]);
        assert_eq!(wrap_points("abcd中", 5, 4), vec![4]);
        assert_eq!(wrap_points("abc", 5, 4), Vec::<usize>::new());
    }

    #[test]
    fn test_tabs_expand_on_screen() {
        let text = TextBuffer::new("\tab");
        let layout = layout(&text, 4, None);

        assert_eq!(layout.buffer_to_screen(&text, Position::new(0, 1)), Position::new(0, 4));
        assert_eq!(
            layout.screen_to_buffer(&text, Position::new(0, 1), ClipDirection::Backward),
            Position::new(0, 0)
        );
        assert_eq!(
            layout.screen_to_buffer(&text, Position::new(0, 1), ClipDirection::Forward),
            Position::new(0, 1)
        );
        assert_eq!(
            layout.screen_to_buffer(&text, Position::new(0, 3), ClipDirection::Closest),
            Position::new(0, 1)
        );
        assert_eq!(
            layout.screen_to_buffer(&text, Position::new(0, 5), ClipDirection::Closest),
            Position::new(0, 2)
        );
    }

    #[test]
    fn test_soft_wrap_rows() {
        let text = TextBuffer::new("abcdefghij\n123");
        let layout = layout(&text, 4, Some(5));

        assert_eq!(layout.screen_row_count(), 3);
        assert_eq!(layout.buffer_to_screen(&text, Position::new(0, 4)), Position::new(0, 4));
        assert_eq!(layout.buffer_to_screen(&text, Position::new(0, 5)), Position::new(1, 0));
        assert_eq!(layout.buffer_to_screen(&text, Position::new(0, 10)), Position::new(1, 5));
        assert_eq!(layout.buffer_to_screen(&text, Position::new(1, 2)), Position::new(2, 2));

        assert_eq!(
            layout.screen_to_buffer(&text, Position::new(1, 1), ClipDirection::Closest),
            Position::new(0, 6)
        );
        assert_eq!(
            layout.screen_to_buffer(&text, Position::new(0, 99), ClipDirection::Backward),
            Position::new(0, 4)
        );
        assert_eq!(
            layout.screen_to_buffer(&text, Position::new(0, 99), ClipDirection::Forward),
            Position::new(0, 5)
        );
        assert_eq!(
            layout.screen_to_buffer(&text, Position::new(2, 99), ClipDirection::Closest),
            Position::new(1, 3)
        );
        assert_eq!(
            layout.screen_to_buffer(&text, Position::new(9, 0), ClipDirection::Closest),
            Position::new(1, 3)
        );
    }
}
