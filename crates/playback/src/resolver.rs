/// Visible-window resolution over a recording's event log
///
/// Visibility is a pure function of the playhead: the window is the
/// prefix of events with `timestamp - started_at <= current_time`,
/// found by binary search. Moving backward just shrinks the window;
/// nothing is replayed or undone.
use recording::{Author, EventLog, EventPayload, SessionEvent, TimestampMs, UserId};
use std::collections::HashMap;

/// Number of events visible at a playhead position
pub fn visible_len(log: &EventLog, started_at: TimestampMs, current_time_ms: f64) -> usize {
    let playhead = started_at + current_time_ms.floor() as TimestampMs;
    log.prefix_len_through(playhead)
}

/// Events visible at a playhead position, as a borrowed prefix
pub fn visible_slice<'a>(
    log: &'a EventLog,
    started_at: TimestampMs,
    current_time_ms: f64,
) -> &'a [SessionEvent] {
    &log.events()[..visible_len(log, started_at, current_time_ms)]
}

/// Latest cursor position known for one participant
#[derive(Debug, Clone, PartialEq)]
pub struct LiveCursor {
    pub author: Author,
    pub x: f64,
    pub y: f64,

    /// When the cursor was last seen
    pub timestamp: TimestampMs,
}

/// Latest cursor per participant within the visible window
///
/// Later events overwrite earlier ones, so each participant ends up
/// with the newest cursor at or before the playhead. This is a
/// latest-state-per-actor snapshot, not an accumulation.
pub fn live_cursors(visible: &[SessionEvent]) -> HashMap<UserId, LiveCursor> {
    let mut cursors = HashMap::new();
    for event in visible {
        // no wildcard: a new payload kind has to choose its cursor
        // behavior here
        match &event.payload {
            EventPayload::Cursor { x, y } => {
                cursors.insert(
                    event.author.id,
                    LiveCursor {
                        author: event.author.clone(),
                        x: *x,
                        y: *y,
                        timestamp: event.timestamp,
                    },
                );
            }
            EventPayload::Click { .. }
            | EventPayload::Edit { .. }
            | EventPayload::ViewChange { .. } => {}
        }
    }
    cursors
}

/// View active at the playhead: the latest view change in the window
pub fn current_view(visible: &[SessionEvent]) -> Option<&str> {
    visible.iter().rev().find_map(|event| match &event.payload {
        EventPayload::ViewChange { view } => Some(view.as_str()),
        EventPayload::Cursor { .. } | EventPayload::Click { .. } | EventPayload::Edit { .. } => {
            None
        }
    })
}
