#![warn(missing_docs)]
//! Editor Cursor - Position and Motion Engine for a Single Editor Cursor
//!
//! # Overview
//!
//! `editor-cursor` models one cursor of a multi-cursor editing session. The cursor owns a marker
//! in the session (a position anchor that survives edits), and answers word, line and paragraph
//! queries over the session's text. It does not store text, render, or decide how multiple
//! cursors interact: those belong to the host.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Cursor (goal column, visibility, events)   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Boundary Scanner (word / boundary rules)   │  ← Motion Targets
//! ├─────────────────────────────────────────────┤
//! │  Word Classifier (boundary pattern)         │  ← Character Classes
//! ├─────────────────────────────────────────────┤
//! │  Session trait (text, screen, markers)      │  ← Host Contract
//! └─────────────────────────────────────────────┘
//! ```
//!
//! [`EditSession`] is a complete [`Session`] built on a rope buffer, a tab/soft-wrap layout and a
//! marker layer. Hosts with their own document model implement [`Session`] directly.
//!
//! # Quick Start
//!
//! ```rust
//! use editor_cursor::{Cursor, CursorConfig, CursorEvent, EditSession, MoveOptions, Position};
//!
//! let mut session = EditSession::new("alpha\nbe\ngamma");
//! let mut cursor = Cursor::new(&mut session, Position::new(0, 4), CursorConfig::default());
//!
//! cursor.subscribe(|event| {
//!     if let CursorEvent::Moved(moved) = event {
//!         println!("moved to {}", moved.new_buffer_position);
//!     }
//! });
//!
//! // The goal column carries the cursor through the short middle line.
//! cursor.move_down(&mut session, 1, MoveOptions::default());
//! assert_eq!(cursor.buffer_position(&session), Position::new(1, 2));
//! cursor.move_down(&mut session, 1, MoveOptions::default());
//! assert_eq!(cursor.buffer_position(&session), Position::new(2, 4));
//!
//! // Text edits move the cursor through its marker.
//! let signals = session.insert(Position::new(2, 0), ">> ");
//! cursor.handle_marker_signals(&mut session, &signals);
//! assert_eq!(cursor.buffer_position(&session), Position::new(2, 7));
//! ```
//!
//! # Module Description
//!
//! - [`position`] - Row/column positions and ranges
//! - [`word`] - Word classification and boundary patterns
//! - [`boundary`] - Word boundary scanning
//! - [`cursor`] - Cursor state machine
//! - [`session`] - Collaborator traits and marker signals
//! - [`edit_session`] - Reference session
//! - [`buffer`] - Rope-backed text buffer
//! - [`layout`] - Tab expansion and soft wrapping
//! - [`marker`] - Marker layer
//! - [`delta`] - Structured text changes
//! - [`config`] - Cursor configuration
//! - [`error`] - Error types
//!
//! # Logging
//!
//! The crate emits `tracing` events (cursor creation and destruction at `debug`, movement at
//! `trace`, ignored calls on destroyed cursors at `warn`). Install a subscriber to see them.

pub mod boundary;
pub mod buffer;
pub mod config;
pub mod cursor;
pub mod delta;
pub mod edit_session;
pub mod error;
pub mod layout;
pub mod marker;
pub mod position;
pub mod session;
pub mod word;

pub use boundary::{BoundaryScanner, WordOptions};
pub use buffer::TextBuffer;
pub use config::{CursorConfig, DEFAULT_NON_WORD_CHARACTERS};
pub use cursor::{
    AutoscrollRequest, Cursor, CursorEvent, CursorEventCallback, CursorMoved, MoveOptions,
};
pub use delta::TextChange;
pub use edit_session::EditSession;
pub use error::CursorError;
pub use layout::{DEFAULT_TAB_WIDTH, DisplayLayout, ScreenRow};
pub use marker::{Marker, MarkerLayer};
pub use position::{Position, Range};
pub use session::{
    ClipDirection, CursorId, MarkerChange, MarkerId, MarkerSignal, ScanControl, ScanMatch,
    Session, TextSource,
};
pub use word::{CharClass, WordClassifier};
