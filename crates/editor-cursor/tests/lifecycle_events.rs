use editor_cursor::{
    AutoscrollRequest, Cursor, CursorConfig, CursorEvent, CursorMoved, EditSession, MarkerSignal,
    MoveOptions, Position, Range, Session,
};
use pretty_assertions::assert_eq;
use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

fn cursor_at(session: &mut EditSession, row: usize, column: usize) -> Cursor {
    Cursor::new(session, Position::new(row, column), CursorConfig::default())
}

fn record(cursor: &mut Cursor) -> Arc<Mutex<Vec<CursorEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    cursor.subscribe(move |event| sink.lock().unwrap().push(*event));
    events
}

fn take(events: &Arc<Mutex<Vec<CursorEvent>>>) -> Vec<CursorEvent> {
    std::mem::take(&mut *events.lock().unwrap())
}

fn set_tail(cursor: &mut Cursor, session: &mut EditSession, tail: Position) {
    if let Some(change) = session
        .set_marker_tail_buffer_position(cursor.marker(), tail)
        .unwrap()
    {
        cursor.handle_marker_signal(session, MarkerSignal::Changed(change));
    }
}

#[test]
fn test_visibility_flips_once_per_range_change() {
    let mut session = EditSession::new("hello world");
    let mut cursor = cursor_at(&mut session, 0, 5);
    let events = record(&mut cursor);

    set_tail(&mut cursor, &mut session, Position::new(0, 0));
    assert!(!cursor.is_visible());
    assert_eq!(take(&events), vec![CursorEvent::VisibilityChanged(false)]);

    // Widening the range keeps the cursor hidden without another notification.
    set_tail(&mut cursor, &mut session, Position::new(0, 1));
    assert!(take(&events).is_empty());

    // A positional write clears the range first.
    cursor.set_buffer_position(&mut session, Position::new(0, 7), None);
    assert!(cursor.is_visible());
    let events = take(&events);
    assert_eq!(events[0], CursorEvent::VisibilityChanged(true));
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, CursorEvent::VisibilityChanged(_)))
            .count(),
        1
    );
}

#[test]
fn test_visible_matches_range_emptiness() {
    let mut session = EditSession::new("abc\ndef");
    let mut cursor = cursor_at(&mut session, 1, 2);

    for tail in [Position::new(0, 0), Position::new(1, 2), Position::new(1, 0)] {
        set_tail(&mut cursor, &mut session, tail);
        assert_eq!(cursor.is_visible(), cursor.buffer_range(&session).is_empty());
    }

    let change = session.clear_marker_tail(cursor.marker()).unwrap().unwrap();
    cursor.handle_marker_signal(&mut session, MarkerSignal::Changed(change));
    assert!(cursor.is_visible());
}

#[test]
fn test_moved_event_payload() {
    let mut session = EditSession::new("\tab\ncd");
    let mut cursor = cursor_at(&mut session, 0, 0);
    let events = record(&mut cursor);

    cursor.move_down(&mut session, 1, MoveOptions::default());

    let events = take(&events);
    assert_eq!(
        events[0],
        CursorEvent::Moved(CursorMoved {
            old_buffer_position: Position::new(0, 0),
            old_screen_position: Position::new(0, 0),
            new_buffer_position: Position::new(1, 0),
            new_screen_position: Position::new(1, 0),
            text_changed: false,
        })
    );
    assert_eq!(
        events[1],
        CursorEvent::Autoscrolled {
            screen_range: Range::empty_at(Position::new(1, 0))
        }
    );
}

#[test]
fn test_text_edits_move_cursor_through_marker() {
    let mut session = EditSession::new("hello world");
    let mut cursor = cursor_at(&mut session, 0, 6);
    let events = record(&mut cursor);

    // Edits after the cursor do not concern it.
    let signals = session.insert(Position::new(0, 11), "!");
    cursor.handle_marker_signals(&mut session, &signals);
    assert!(take(&events).is_empty());

    let signals = session.insert(Position::new(0, 0), ">> ");
    cursor.handle_marker_signals(&mut session, &signals);
    assert_eq!(cursor.buffer_position(&session), Position::new(0, 9));
    assert_eq!(
        take(&events),
        vec![CursorEvent::Moved(CursorMoved {
            old_buffer_position: Position::new(0, 6),
            old_screen_position: Position::new(0, 6),
            new_buffer_position: Position::new(0, 9),
            new_screen_position: Position::new(0, 9),
            text_changed: true,
        })]
    );

    let signals = session.delete(Range::new((0, 2), (0, 12)));
    cursor.handle_marker_signals(&mut session, &signals);
    assert_eq!(cursor.buffer_position(&session), Position::new(0, 2));
    assert_eq!(session.text(), ">>d!");
}

#[test]
fn test_edit_clears_goal_column() {
    let mut session = EditSession::new("abcdef\nab\nabcdef");
    let mut cursor = cursor_at(&mut session, 0, 5);
    cursor.move_down(&mut session, 1, MoveOptions::default());
    assert_eq!(cursor.goal_column(), Some(5));

    let signals = session.insert(Position::new(1, 0), "x");
    cursor.handle_marker_signals(&mut session, &signals);
    assert_eq!(cursor.goal_column(), None);
}

#[test]
fn test_destroy_emits_exactly_once() {
    let mut session = EditSession::new("hello");
    let mut cursor = cursor_at(&mut session, 0, 2);
    let events = record(&mut cursor);

    cursor.destroy(&mut session);
    cursor.destroy(&mut session);
    cursor.handle_marker_signal(&mut session, MarkerSignal::Destroyed);

    assert_eq!(take(&events), vec![CursorEvent::Destroyed]);
    assert!(cursor.is_destroyed());
    assert_eq!(session.cursor_ids().count(), 0);
}

#[test]
fn test_destroyed_cursor_is_inert() {
    let mut session = EditSession::new("one two\nthree");
    let mut cursor = cursor_at(&mut session, 0, 1);
    let events = record(&mut cursor);
    cursor.destroy(&mut session);
    take(&events);

    cursor.move_right(&mut session, 1, MoveOptions::default());
    cursor.move_down(&mut session, 1, MoveOptions::default());
    cursor.move_to_end_of_word(&mut session);
    cursor.move_to_bottom(&mut session);
    cursor.move_to_beginning_of_next_paragraph(&mut session);
    cursor.skip_leading_whitespace(&mut session);
    cursor.set_visible(&session, false);
    cursor.autoscroll(&session);

    assert!(take(&events).is_empty());
    assert_eq!(cursor.buffer_position(&session), Position::new(0, 1));
    assert!(cursor.is_visible());
    assert_eq!(cursor.goal_column(), None);
}

#[test]
fn test_marker_destroyed_by_session() {
    let mut session = EditSession::new("text");
    let mut cursor = cursor_at(&mut session, 0, 3);
    let events = record(&mut cursor);

    assert!(session.destroy_marker(cursor.marker()));
    cursor.handle_marker_signal(&mut session, MarkerSignal::Destroyed);
    cursor.handle_marker_signal(&mut session, MarkerSignal::Destroyed);

    assert_eq!(take(&events), vec![CursorEvent::Destroyed]);
    assert!(!session.is_last_cursor(cursor.id()));
}

#[test]
fn test_last_cursor_moves_back_when_newest_is_destroyed() {
    let mut session = EditSession::new("abc");
    let mut first = cursor_at(&mut session, 0, 0);
    let mut second = cursor_at(&mut session, 0, 2);

    assert!(!first.is_last_cursor(&session));
    assert!(second.is_last_cursor(&session));

    second.destroy(&mut session);
    assert!(first.is_last_cursor(&session));

    first.set_buffer_position(&mut session, Position::new(0, 1), None);
    assert_eq!(first.needs_autoscroll(), AutoscrollRequest::Requested);
}

#[test]
fn test_becoming_visible_requests_autoscroll_for_last_cursor() {
    let mut session = EditSession::new("abc");
    let mut cursor = cursor_at(&mut session, 0, 1);
    let events = record(&mut cursor);

    cursor.set_visible(&session, false);
    cursor.clear_autoscroll();
    cursor.set_visible(&session, true);

    assert_eq!(cursor.needs_autoscroll(), AutoscrollRequest::Requested);
    assert_eq!(
        take(&events),
        vec![
            CursorEvent::VisibilityChanged(false),
            CursorEvent::VisibilityChanged(true),
        ]
    );
}

#[test]
fn test_compare_orders_by_buffer_position() {
    let mut session = EditSession::new("abc\ndef");
    let a = cursor_at(&mut session, 0, 2);
    let b = cursor_at(&mut session, 1, 0);
    let c = cursor_at(&mut session, 1, 0);

    assert_eq!(a.compare(&b, &session), Ordering::Less);
    assert_eq!(b.compare(&a, &session), Ordering::Greater);
    assert_eq!(b.compare(&c, &session), Ordering::Equal);
}

#[test]
fn test_listeners_can_be_moved_across_threads() {
    let mut session = EditSession::new("abc");
    let mut cursor = cursor_at(&mut session, 0, 0);
    let (tx, rx) = std::sync::mpsc::channel();
    cursor.subscribe(move |event| {
        let _ = tx.send(*event);
    });

    let handle = std::thread::spawn(move || {
        cursor.set_buffer_position(&mut session, Position::new(0, 3), Some(false));
        cursor
    });
    let cursor = handle.join().unwrap();

    assert!(!cursor.is_destroyed());
    assert!(matches!(rx.recv().unwrap(), CursorEvent::Moved(_)));
}
