//! Cursor state machine.
//!
//! A [`Cursor`] owns one marker in its [`Session`] and keeps the state that a plain position does
//! not carry: the goal column for vertical moves, visibility, the autoscroll request and the
//! terminal destroyed flag.
//!
//! # Signals and events
//!
//! Every positional write goes through the session, which answers synchronously with the
//! [`MarkerChange`] it produced. The cursor feeds that change to the same handler used for
//! signals raised by text edits ([`Cursor::handle_marker_signal`]), so listeners observe the new
//! position before the write returns.
//!
//! Listeners registered with [`Cursor::subscribe`] receive [`CursorEvent`]s:
//!
//! - [`CursorEvent::Moved`] when the head moved on screen,
//! - [`CursorEvent::VisibilityChanged`] on every visibility flip,
//! - [`CursorEvent::Autoscrolled`] when a move asks the viewport to follow,
//! - [`CursorEvent::Destroyed`] exactly once.
//!
//! After destruction every mutating call is ignored (and logged at `warn` level).
//!
//! # Example
//!
//! ```rust
//! use editor_cursor::{Cursor, CursorConfig, EditSession, Position};
//!
//! let mut session = EditSession::new("  foo bar");
//! let mut cursor = Cursor::new(&mut session, Position::new(0, 2), CursorConfig::default());
//!
//! cursor.move_to_end_of_word(&mut session);
//! assert_eq!(cursor.buffer_position(&session), Position::new(0, 5));
//!
//! cursor.move_to_beginning_of_next_word(&mut session);
//! assert_eq!(cursor.buffer_position(&session), Position::new(0, 6));
//! ```

use crate::boundary::{BoundaryScanner, WordOptions};
use crate::config::CursorConfig;
use crate::error::CursorError;
use crate::position::{Position, Range};
use crate::session::{ClipDirection, CursorId, MarkerChange, MarkerId, MarkerSignal, Session};
use crate::word::{CharClass, WordClassifier};
use regex::Regex;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, trace, warn};

/// Cursor event callback function type
pub type CursorEventCallback = Box<dyn FnMut(&CursorEvent) + Send>;

/// Whether the viewport should scroll to keep a cursor in view.
///
/// `Undecided` is distinct from `Declined`: only an undecided request is filled in by moves
/// caused by text edits or by the cursor becoming visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoscrollRequest {
    /// No decision has been made since the last reset.
    #[default]
    Undecided,
    /// The viewport should follow this cursor.
    Requested,
    /// The viewport should stay where it is.
    Declined,
}

impl AutoscrollRequest {
    fn from_flag(requested: bool) -> Self {
        if requested { Self::Requested } else { Self::Declined }
    }

    /// Returns `true` for [`AutoscrollRequest::Requested`].
    pub fn is_requested(self) -> bool {
        self == Self::Requested
    }

    fn decide(&mut self, requested: bool) {
        if *self == Self::Undecided {
            *self = Self::from_flag(requested);
        }
    }
}

/// Payload of [`CursorEvent::Moved`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorMoved {
    /// Buffer position before the move.
    pub old_buffer_position: Position,
    /// Screen position before the move.
    pub old_screen_position: Position,
    /// Buffer position after the move.
    pub new_buffer_position: Position,
    /// Screen position after the move.
    pub new_screen_position: Position,
    /// `true` if a text edit moved the cursor.
    pub text_changed: bool,
}

/// Notifications raised by a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorEvent {
    /// The head position changed.
    Moved(CursorMoved),
    /// The cursor became visible (`true`) or hidden (`false`).
    VisibilityChanged(bool),
    /// The viewport should scroll to show `screen_range`.
    Autoscrolled {
        /// Screen range of the cursor at the time of the request.
        screen_range: Range,
    },
    /// The cursor was destroyed. Raised once; no event follows it.
    Destroyed,
}

/// Options for the directional moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOptions {
    /// With a non-empty range, jump to the range end in the direction of the move instead of
    /// moving from the head.
    pub move_to_end_of_selection: bool,
}

/// A single editor cursor.
pub struct Cursor {
    id: CursorId,
    marker: MarkerId,
    config: CursorConfig,
    goal_column: Option<usize>,
    visible: bool,
    autoscroll: AutoscrollRequest,
    destroyed: bool,
    last_head: Position,
    listeners: Vec<CursorEventCallback>,
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("id", &self.id)
            .field("marker", &self.marker)
            .field("goal_column", &self.goal_column)
            .field("visible", &self.visible)
            .field("autoscroll", &self.autoscroll)
            .field("destroyed", &self.destroyed)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Cursor {
    /// Create a cursor at `position`, backed by a new marker registered with `session`.
    ///
    /// The new cursor is the session's last cursor, so it starts visible with autoscroll
    /// requested.
    pub fn new<S: Session + ?Sized>(
        session: &mut S,
        position: Position,
        config: CursorConfig,
    ) -> Self {
        let marker = session.create_marker(position);
        let id = session.register_cursor(marker);
        let last_head = session.marker_head(marker).unwrap_or(position);
        debug!(cursor = id.0, marker = marker.0, position = %last_head, "cursor created");

        let mut autoscroll = AutoscrollRequest::Undecided;
        autoscroll.decide(session.is_last_cursor(id));

        Self {
            id,
            marker,
            config,
            goal_column: None,
            visible: true,
            autoscroll,
            destroyed: false,
            last_head,
            listeners: Vec::new(),
        }
    }

    /// Session-assigned id.
    pub fn id(&self) -> CursorId {
        self.id
    }

    /// The marker backing this cursor.
    pub fn marker(&self) -> MarkerId {
        self.marker
    }

    /// Current configuration.
    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// Replace the configuration. Word patterns pick up the new value on their next use.
    pub fn set_config(&mut self, config: CursorConfig) -> Result<(), CursorError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Column remembered across vertical moves.
    pub fn goal_column(&self) -> Option<usize> {
        self.goal_column
    }

    /// Returns `true` unless the cursor spans a non-empty range.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns `true` once the cursor has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Pending autoscroll request.
    pub fn needs_autoscroll(&self) -> AutoscrollRequest {
        self.autoscroll
    }

    /// Reset the autoscroll request to undecided.
    pub fn clear_autoscroll(&mut self) {
        self.autoscroll = AutoscrollRequest::Undecided;
    }

    /// Subscribe to cursor events
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&CursorEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(callback));
    }

    fn emit(&mut self, event: CursorEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    fn ensure_live(&self, operation: &'static str) -> bool {
        if self.destroyed {
            warn!(cursor = self.id.0, operation, "ignoring call on destroyed cursor");
        }
        !self.destroyed
    }

    /// Head position in buffer coordinates.
    pub fn buffer_position<S: Session + ?Sized>(&self, session: &S) -> Position {
        session.marker_head(self.marker).unwrap_or(self.last_head)
    }

    /// Head position in screen coordinates.
    pub fn screen_position<S: Session + ?Sized>(&self, session: &S) -> Position {
        session.buffer_to_screen(self.buffer_position(session))
    }

    /// Buffer row of the head.
    pub fn buffer_row<S: Session + ?Sized>(&self, session: &S) -> usize {
        self.buffer_position(session).row
    }

    /// Buffer column of the head.
    pub fn buffer_column<S: Session + ?Sized>(&self, session: &S) -> usize {
        self.buffer_position(session).column
    }

    /// Screen row of the head.
    pub fn screen_row<S: Session + ?Sized>(&self, session: &S) -> usize {
        self.screen_position(session).row
    }

    /// Screen column of the head.
    pub fn screen_column<S: Session + ?Sized>(&self, session: &S) -> usize {
        self.screen_position(session).column
    }

    /// Buffer range spanned by the marker.
    pub fn buffer_range<S: Session + ?Sized>(&self, session: &S) -> Range {
        session
            .marker_buffer_range(self.marker)
            .unwrap_or_else(|| Range::empty_at(self.last_head))
    }

    /// Screen range spanned by the marker.
    pub fn screen_range<S: Session + ?Sized>(&self, session: &S) -> Range {
        session
            .marker_screen_range(self.marker)
            .unwrap_or_else(|| Range::empty_at(session.buffer_to_screen(self.last_head)))
    }

    /// Move to a screen position.
    ///
    /// `autoscroll` overrides the default request, which is "this is the session's last cursor".
    pub fn set_screen_position<S: Session + ?Sized>(
        &mut self,
        session: &mut S,
        position: Position,
        autoscroll: Option<bool>,
    ) {
        self.set_screen_position_clipped(session, position, ClipDirection::Closest, autoscroll);
    }

    /// Move to a buffer position. See [`set_screen_position`](Self::set_screen_position).
    pub fn set_buffer_position<S: Session + ?Sized>(
        &mut self,
        session: &mut S,
        position: Position,
        autoscroll: Option<bool>,
    ) {
        if !self.ensure_live("set_buffer_position") {
            return;
        }
        let marker = self.marker;
        self.change_position(session, autoscroll, |session| {
            session.set_marker_head_buffer_position(marker, position)
        });
    }

    fn set_screen_position_clipped<S: Session + ?Sized>(
        &mut self,
        session: &mut S,
        position: Position,
        clip: ClipDirection,
        autoscroll: Option<bool>,
    ) {
        if !self.ensure_live("set_screen_position") {
            return;
        }
        let marker = self.marker;
        self.change_position(session, autoscroll, |session| {
            session.set_marker_head_screen_position(marker, position, clip)
        });
    }

    fn change_position<S, F>(&mut self, session: &mut S, autoscroll: Option<bool>, write: F)
    where
        S: Session + ?Sized,
        F: FnOnce(&mut S) -> Result<Option<MarkerChange>, CursorError>,
    {
        self.clear_selection(session);
        self.autoscroll = AutoscrollRequest::from_flag(
            autoscroll.unwrap_or_else(|| session.is_last_cursor(self.id)),
        );

        match write(session) {
            Ok(Some(change)) => self.marker_changed(session, change),
            Ok(None) => {}
            Err(err) => warn!(cursor = self.id.0, error = %err, "marker write failed"),
        }

        self.goal_column = None;
        if self.autoscroll.is_requested() {
            self.autoscroll(session);
        }
    }

    fn clear_selection<S: Session + ?Sized>(&mut self, session: &mut S) {
        match session.clear_marker_tail(self.marker) {
            Ok(Some(change)) => self.marker_changed(session, change),
            Ok(None) => {}
            Err(err) => warn!(cursor = self.id.0, error = %err, "clearing selection failed"),
        }
    }

    /// Emit an [`CursorEvent::Autoscrolled`] for the current screen range.
    pub fn autoscroll<S: Session + ?Sized>(&mut self, session: &S) {
        if !self.ensure_live("autoscroll") {
            return;
        }
        let screen_range = self.screen_range(session);
        trace!(cursor = self.id.0, %screen_range, "autoscroll");
        self.emit(CursorEvent::Autoscrolled { screen_range });
    }

    /// React to a signal raised by this cursor's marker.
    pub fn handle_marker_signal<S: Session + ?Sized>(
        &mut self,
        session: &mut S,
        signal: MarkerSignal,
    ) {
        match signal {
            MarkerSignal::Changed(change) => {
                if self.ensure_live("handle_marker_signal") {
                    self.marker_changed(session, change);
                }
            }
            MarkerSignal::Destroyed => self.marker_destroyed(session),
        }
    }

    /// Deliver the signals addressed to this cursor's marker, ignoring the rest.
    pub fn handle_marker_signals<S: Session + ?Sized>(
        &mut self,
        session: &mut S,
        signals: &[(MarkerId, MarkerSignal)],
    ) {
        for &(marker, signal) in signals {
            if marker == self.marker {
                self.handle_marker_signal(session, signal);
            }
        }
    }

    fn marker_changed<S: Session + ?Sized>(&mut self, session: &S, change: MarkerChange) {
        self.last_head = change.new_head_buffer_position;
        self.update_visibility(session, change.new_buffer_range().is_empty());

        if !change.head_moved() {
            return;
        }

        self.goal_column = None;
        self.autoscroll
            .decide(session.is_last_cursor(self.id) && !change.text_changed);

        let moved = CursorMoved {
            old_buffer_position: change.old_head_buffer_position,
            old_screen_position: change.old_head_screen_position,
            new_buffer_position: change.new_head_buffer_position,
            new_screen_position: change.new_head_screen_position,
            text_changed: change.text_changed,
        };
        trace!(
            cursor = self.id.0,
            from = %moved.old_buffer_position,
            to = %moved.new_buffer_position,
            text_changed = moved.text_changed,
            "cursor moved"
        );
        self.emit(CursorEvent::Moved(moved));
    }

    fn marker_destroyed<S: Session + ?Sized>(&mut self, session: &mut S) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        session.remove_cursor(self.id);
        debug!(cursor = self.id.0, marker = self.marker.0, "cursor destroyed");
        self.emit(CursorEvent::Destroyed);
        self.listeners.clear();
    }

    /// Destroy the cursor and its marker. Calling it again does nothing.
    pub fn destroy<S: Session + ?Sized>(&mut self, session: &mut S) {
        if self.destroyed {
            return;
        }
        self.last_head = self.buffer_position(session);
        session.destroy_marker(self.marker);
        self.marker_destroyed(session);
    }

    /// Show or hide the cursor.
    ///
    /// Becoming visible requests autoscroll for the session's last cursor when no decision has
    /// been made yet.
    pub fn set_visible<S: Session + ?Sized>(&mut self, session: &S, visible: bool) {
        if self.ensure_live("set_visible") {
            self.update_visibility(session, visible);
        }
    }

    fn update_visibility<S: Session + ?Sized>(&mut self, session: &S, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        if visible && session.is_last_cursor(self.id) {
            self.autoscroll.decide(true);
        }
        trace!(cursor = self.id.0, visible, "visibility changed");
        self.emit(CursorEvent::VisibilityChanged(visible));
    }

    /// Move up `row_count` screen rows, keeping the goal column.
    pub fn move_up<S: Session + ?Sized>(
        &mut self,
        session: &mut S,
        row_count: usize,
        options: MoveOptions,
    ) {
        if !self.ensure_live("move_up") {
            return;
        }
        let range = self.screen_range(session);
        let from = if options.move_to_end_of_selection && !range.is_empty() {
            range.start
        } else {
            self.screen_position(session)
        };
        let column = self.goal_column.unwrap_or(from.column);
        let target = match from.row.checked_sub(row_count) {
            Some(row) => Position::new(row, column),
            None => Position::zero(),
        };
        self.move_vertically_to(session, target);
        self.goal_column = Some(column);
    }

    /// Move down `row_count` screen rows, keeping the goal column.
    pub fn move_down<S: Session + ?Sized>(
        &mut self,
        session: &mut S,
        row_count: usize,
        options: MoveOptions,
    ) {
        if !self.ensure_live("move_down") {
            return;
        }
        let range = self.screen_range(session);
        let from = if options.move_to_end_of_selection && !range.is_empty() {
            range.end
        } else {
            self.screen_position(session)
        };
        let column = self.goal_column.unwrap_or(from.column);
        let target = Position::new(from.row.saturating_add(row_count), column);
        self.move_vertically_to(session, target);
        self.goal_column = Some(column);
    }

    fn move_vertically_to<S: Session + ?Sized>(&mut self, session: &mut S, target: Position) {
        // Past the row end, stay on the target row even if it is a wrapped segment.
        let clip = if target.column >= session.screen_line_length(target.row) {
            ClipDirection::Backward
        } else {
            ClipDirection::Closest
        };
        let marker = self.marker;
        self.change_position(session, None, |session| {
            session.set_marker_head_screen_position(marker, target, clip)
        });
    }

    /// Move left `column_count` screen columns, wrapping to the end of earlier rows.
    pub fn move_left<S: Session + ?Sized>(
        &mut self,
        session: &mut S,
        column_count: usize,
        options: MoveOptions,
    ) {
        if !self.ensure_live("move_left") {
            return;
        }
        let range = self.screen_range(session);
        if options.move_to_end_of_selection && !range.is_empty() {
            self.set_screen_position(session, range.start, None);
            return;
        }

        let Position { mut row, mut column } = self.screen_position(session);
        let mut column_count = column_count;
        while column_count > column && row > 0 {
            column_count -= column + 1;
            row -= 1;
            column = session.screen_line_length(row);
        }
        let target = Position::new(row, column.saturating_sub(column_count));
        self.set_screen_position_clipped(session, target, ClipDirection::Backward, None);
    }

    /// Move right `column_count` screen columns, wrapping to the start of later rows.
    pub fn move_right<S: Session + ?Sized>(
        &mut self,
        session: &mut S,
        column_count: usize,
        options: MoveOptions,
    ) {
        if !self.ensure_live("move_right") {
            return;
        }
        let range = self.screen_range(session);
        if options.move_to_end_of_selection && !range.is_empty() {
            self.set_screen_position(session, range.end, None);
            return;
        }

        let Position { mut row, mut column } = self.screen_position(session);
        let row_count = session.screen_line_count();
        let mut column_count = column_count;
        let mut remaining = session.screen_line_length(row).saturating_sub(column);
        while column_count > remaining && row + 1 < row_count {
            column_count -= remaining + 1;
            column = 0;
            row += 1;
            remaining = session.screen_line_length(row);
        }
        let target = Position::new(row, column.saturating_add(column_count));
        self.set_screen_position_clipped(session, target, ClipDirection::Forward, None);
    }

    /// Move to the start of the buffer.
    pub fn move_to_top<S: Session + ?Sized>(&mut self, session: &mut S) {
        self.set_buffer_position(session, Position::zero(), None);
    }

    /// Move to the end of the buffer. The goal column survives.
    pub fn move_to_bottom<S: Session + ?Sized>(&mut self, session: &mut S) {
        let column = self.goal_column;
        let end = session.end_of_buffer();
        self.set_buffer_position(session, end, None);
        self.goal_column = column;
    }

    /// Move to column 0 of the current screen row.
    pub fn move_to_beginning_of_screen_line<S: Session + ?Sized>(&mut self, session: &mut S) {
        let row = self.screen_row(session);
        self.set_screen_position(session, Position::new(row, 0), None);
    }

    /// Move to column 0 of the current buffer row.
    pub fn move_to_beginning_of_line<S: Session + ?Sized>(&mut self, session: &mut S) {
        let row = self.buffer_row(session);
        self.set_buffer_position(session, Position::new(row, 0), None);
    }

    /// Move to the first non-whitespace character of the screen row, or to the row start if
    /// already there.
    pub fn move_to_first_character_of_line<S: Session + ?Sized>(&mut self, session: &mut S) {
        if !self.ensure_live("move_to_first_character_of_line") {
            return;
        }
        let screen_row = self.screen_row(session);
        let start = session.screen_to_buffer(Position::new(screen_row, 0), ClipDirection::Closest);
        let end = session.screen_to_buffer(
            Position::new(screen_row, Position::END_OF_ROW),
            ClipDirection::Forward,
        );

        let text = session.line_text(start.row).unwrap_or_default();
        let first_character = text
            .chars()
            .enumerate()
            .skip(start.column)
            .take(end.column.saturating_sub(start.column))
            .find(|(_, ch)| !ch.is_whitespace())
            .map(|(column, _)| column);

        let column = match first_character {
            Some(column) if column != self.buffer_column(session) => column,
            _ => start.column,
        };
        self.set_buffer_position(session, Position::new(start.row, column), None);
    }

    /// Move to the end of the current screen row.
    pub fn move_to_end_of_screen_line<S: Session + ?Sized>(&mut self, session: &mut S) {
        let row = self.screen_row(session);
        self.set_screen_position_clipped(
            session,
            Position::new(row, Position::END_OF_ROW),
            ClipDirection::Backward,
            None,
        );
    }

    /// Move to the end of the current buffer row.
    pub fn move_to_end_of_line<S: Session + ?Sized>(&mut self, session: &mut S) {
        let row = self.buffer_row(session);
        self.set_buffer_position(session, Position::new(row, Position::END_OF_ROW), None);
    }

    /// Move past the row's leading spaces and tabs. Never moves backward.
    pub fn skip_leading_whitespace<S: Session + ?Sized>(&mut self, session: &mut S) {
        if !self.ensure_live("skip_leading_whitespace") {
            return;
        }
        let position = self.buffer_position(session);
        let text = session.line_text(position.row).unwrap_or_default();
        let indent = text.chars().take_while(|&ch| ch == ' ' || ch == '\t').count();
        let end_of_indent = Position::new(position.row, indent);
        if end_of_indent > position {
            self.set_buffer_position(session, end_of_indent, None);
        }
    }

    fn move_to_word_target<S: Session + ?Sized>(&mut self, session: &mut S, target: Position) {
        if target != self.buffer_position(session) {
            self.set_buffer_position(session, target, None);
        }
    }

    /// Move to the start of the current word (or the previous one, at a word start).
    pub fn move_to_beginning_of_word<S: Session + ?Sized>(&mut self, session: &mut S) {
        if !self.ensure_live("move_to_beginning_of_word") {
            return;
        }
        let target =
            self.beginning_of_current_word_buffer_position(session, &WordOptions::default());
        self.move_to_word_target(session, target);
    }

    /// Move to the end of the current word (or the next one, at a word end).
    pub fn move_to_end_of_word<S: Session + ?Sized>(&mut self, session: &mut S) {
        if !self.ensure_live("move_to_end_of_word") {
            return;
        }
        let target = self.end_of_current_word_buffer_position(session, &WordOptions::default());
        self.move_to_word_target(session, target);
    }

    /// Move to the start of the next word.
    pub fn move_to_beginning_of_next_word<S: Session + ?Sized>(&mut self, session: &mut S) {
        if !self.ensure_live("move_to_beginning_of_next_word") {
            return;
        }
        let target =
            self.beginning_of_next_word_buffer_position(session, &WordOptions::default());
        self.move_to_word_target(session, target);
    }

    /// Move to the previous word boundary.
    pub fn move_to_previous_word_boundary<S: Session + ?Sized>(&mut self, session: &mut S) {
        if !self.ensure_live("move_to_previous_word_boundary") {
            return;
        }
        let target = self.previous_word_boundary_buffer_position(session, &WordOptions::default());
        self.move_to_word_target(session, target);
    }

    /// Move to the next word boundary.
    pub fn move_to_next_word_boundary<S: Session + ?Sized>(&mut self, session: &mut S) {
        if !self.ensure_live("move_to_next_word_boundary") {
            return;
        }
        let target = self.next_word_boundary_buffer_position(session, &WordOptions::default());
        self.move_to_word_target(session, target);
    }

    /// Move to the next blank row, or to the end of the buffer.
    pub fn move_to_beginning_of_next_paragraph<S: Session + ?Sized>(&mut self, session: &mut S) {
        if !self.ensure_live("move_to_beginning_of_next_paragraph") {
            return;
        }
        let target = self.next_paragraph_boundary_buffer_position(session);
        self.set_buffer_position(session, target, None);
    }

    /// Move to the previous blank row, or to the start of the buffer.
    pub fn move_to_beginning_of_previous_paragraph<S: Session + ?Sized>(
        &mut self,
        session: &mut S,
    ) {
        if !self.ensure_live("move_to_beginning_of_previous_paragraph") {
            return;
        }
        let target = self.previous_paragraph_boundary_buffer_position(session);
        self.set_buffer_position(session, target, None);
    }

    /// Compile the word pattern for the current configuration.
    pub fn word_regex(&self, include_non_word_characters: bool) -> Result<Regex, CursorError> {
        self.word_classifier().regex(include_non_word_characters)
    }

    fn word_classifier(&self) -> WordClassifier {
        WordClassifier::new(&self.config.non_word_characters)
    }

    fn resolve_word_regex<'r>(
        &self,
        options: &WordOptions<'r>,
    ) -> Result<Cow<'r, Regex>, CursorError> {
        match options.word_regex {
            Some(regex) => Ok(Cow::Borrowed(regex)),
            None => self
                .word_regex(options.include_non_word_characters)
                .map(Cow::Owned),
        }
    }

    fn scan_words<S, R>(
        &self,
        session: &S,
        options: &WordOptions<'_>,
        fallback: R,
        query: impl FnOnce(&BoundaryScanner<'_, S>) -> R,
    ) -> R
    where
        S: Session + ?Sized,
    {
        match self.resolve_word_regex(options) {
            Ok(regex) => query(&BoundaryScanner::new(session, &regex)),
            Err(err) => {
                warn!(cursor = self.id.0, error = %err, "word pattern unavailable");
                fallback
            }
        }
    }

    /// Start of the word at or before the head.
    pub fn beginning_of_current_word_buffer_position<S: Session + ?Sized>(
        &self,
        session: &S,
        options: &WordOptions<'_>,
    ) -> Position {
        let position = self.buffer_position(session);
        self.scan_words(session, options, position, |scanner| {
            scanner.beginning_of_current_word(position, options.allow_previous)
        })
    }

    /// End of the word at or after the head.
    pub fn end_of_current_word_buffer_position<S: Session + ?Sized>(
        &self,
        session: &S,
        options: &WordOptions<'_>,
    ) -> Position {
        let position = self.buffer_position(session);
        self.scan_words(session, options, position, |scanner| {
            scanner.end_of_current_word(position, options.allow_next)
        })
    }

    /// Start of the next word.
    pub fn beginning_of_next_word_buffer_position<S: Session + ?Sized>(
        &self,
        session: &S,
        options: &WordOptions<'_>,
    ) -> Position {
        let position = self.buffer_position(session);
        self.scan_words(session, options, position, |scanner| {
            scanner.beginning_of_next_word(position)
        })
    }

    /// Closest word boundary before the head.
    pub fn previous_word_boundary_buffer_position<S: Session + ?Sized>(
        &self,
        session: &S,
        options: &WordOptions<'_>,
    ) -> Position {
        let position = self.buffer_position(session);
        self.scan_words(session, options, position, |scanner| {
            scanner.previous_word_boundary(position)
        })
    }

    /// Closest word boundary after the head.
    pub fn next_word_boundary_buffer_position<S: Session + ?Sized>(
        &self,
        session: &S,
        options: &WordOptions<'_>,
    ) -> Position {
        let position = self.buffer_position(session);
        self.scan_words(session, options, position, |scanner| {
            scanner.next_word_boundary(position)
        })
    }

    /// The word around the head, never extending into neighbouring words.
    pub fn current_word_buffer_range<S: Session + ?Sized>(
        &self,
        session: &S,
        options: &WordOptions<'_>,
    ) -> Range {
        let position = self.buffer_position(session);
        self.scan_words(session, options, Range::empty_at(position), |scanner| {
            scanner.current_word_range(position)
        })
    }

    /// Returns `true` if a word starts exactly at the head.
    pub fn is_inside_word<S: Session + ?Sized>(&self, session: &S, options: &WordOptions<'_>) -> bool {
        let position = self.buffer_position(session);
        self.scan_words(session, options, false, |scanner| scanner.is_inside_word(position))
    }

    /// Text of the head's buffer row.
    pub fn current_buffer_line<S: Session + ?Sized>(&self, session: &S) -> String {
        session
            .line_text(self.buffer_row(session))
            .map(Cow::into_owned)
            .unwrap_or_default()
    }

    /// Buffer range of the head's row, optionally including its line terminator.
    pub fn current_line_buffer_range<S: Session + ?Sized>(
        &self,
        session: &S,
        include_newline: bool,
    ) -> Range {
        let row = self.buffer_row(session);
        if include_newline && row + 1 < session.line_count() {
            Range::new((row, 0), (row + 1, 0))
        } else {
            let end = session.clip_buffer_position(Position::new(row, Position::END_OF_ROW));
            Range::new((row, 0), end)
        }
    }

    /// The run of non-blank rows containing the head, or `None` on a blank row.
    pub fn current_paragraph_buffer_range<S: Session + ?Sized>(&self, session: &S) -> Option<Range> {
        let row = self.buffer_row(session);
        if session.is_row_blank(row) {
            return None;
        }
        let mut first = row;
        while first > 0 && !session.is_row_blank(first - 1) {
            first -= 1;
        }
        let mut last = row;
        while last + 1 < session.line_count() && !session.is_row_blank(last + 1) {
            last += 1;
        }
        let end = session.clip_buffer_position(Position::new(last, Position::END_OF_ROW));
        Some(Range::new((first, 0), end))
    }

    /// Start of the first blank row below the head, or the end of the buffer.
    pub fn next_paragraph_boundary_buffer_position<S: Session + ?Sized>(
        &self,
        session: &S,
    ) -> Position {
        let row = self.buffer_row(session);
        (row + 1..session.line_count())
            .find(|&r| session.is_row_blank(r))
            .map_or_else(|| session.end_of_buffer(), |r| Position::new(r, 0))
    }

    /// Start of the nearest blank row above the head, or the start of the buffer.
    pub fn previous_paragraph_boundary_buffer_position<S: Session + ?Sized>(
        &self,
        session: &S,
    ) -> Position {
        let row = self.buffer_row(session);
        (1..row)
            .rev()
            .find(|&r| session.is_row_blank(r))
            .map_or(Position::zero(), |r| Position::new(r, 0))
    }

    /// Returns `true` at column 0.
    pub fn is_at_beginning_of_line<S: Session + ?Sized>(&self, session: &S) -> bool {
        self.buffer_column(session) == 0
    }

    /// Returns `true` at the end of the buffer row.
    pub fn is_at_end_of_line<S: Session + ?Sized>(&self, session: &S) -> bool {
        let position = self.buffer_position(session);
        position == session.clip_buffer_position(position.with_column(Position::END_OF_ROW))
    }

    /// Characters on either side of the head within its row.
    fn neighbours<S: Session + ?Sized>(&self, session: &S) -> (Option<char>, Option<char>) {
        let position = self.buffer_position(session);
        let text = session.line_text(position.row).unwrap_or_default();
        let before = position
            .column
            .checked_sub(1)
            .and_then(|column| text.chars().nth(column));
        let after = text.chars().nth(position.column);
        (before, after)
    }

    /// Returns `true` if both neighbouring characters are whitespace. A row edge counts as
    /// whitespace.
    pub fn is_surrounded_by_whitespace<S: Session + ?Sized>(&self, session: &S) -> bool {
        let classifier = self.word_classifier();
        let is_whitespace = |ch: char| classifier.classify(ch) == CharClass::Whitespace;
        let (before, after) = self.neighbours(session);
        before.is_none_or(is_whitespace) && after.is_none_or(is_whitespace)
    }

    /// Returns `true` if exactly one neighbour is a non-word character and neither is
    /// whitespace.
    pub fn is_between_word_and_non_word<S: Session + ?Sized>(&self, session: &S) -> bool {
        let (Some(before), Some(after)) = self.neighbours(session) else {
            return false;
        };
        let classifier = self.word_classifier();
        match (classifier.classify(before), classifier.classify(after)) {
            (CharClass::Whitespace, _) | (_, CharClass::Whitespace) => false,
            (before, after) => before != after,
        }
    }

    /// Indentation level of the head: the column, divided by the tab width with soft tabs.
    pub fn indent_level<S: Session + ?Sized>(&self, session: &S) -> f64 {
        let column = self.buffer_column(session) as f64;
        if self.config.soft_tabs {
            column / self.config.tab_width.max(1) as f64
        } else {
            column
        }
    }

    /// Returns `true` if non-whitespace characters precede the head on its row.
    pub fn has_preceding_characters_on_line<S: Session + ?Sized>(&self, session: &S) -> bool {
        let position = self.buffer_position(session);
        let text = session.line_text(position.row).unwrap_or_default();
        text.chars()
            .position(|ch| !ch.is_whitespace())
            .is_some_and(|first| position.column > first)
    }

    /// Returns `true` if this is the session's most recently added cursor.
    pub fn is_last_cursor<S: Session + ?Sized>(&self, session: &S) -> bool {
        !self.destroyed && session.is_last_cursor(self.id)
    }

    /// Order two cursors by buffer position.
    pub fn compare<S: Session + ?Sized>(&self, other: &Cursor, session: &S) -> Ordering {
        self.buffer_position(session).cmp(&other.buffer_position(session))
    }
}
