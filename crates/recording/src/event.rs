/// Typed session events and the ordered event log
use crate::{EventId, TimestampMs, UserId};
use serde::{Deserialize, Serialize};

/// Participant identity carried on events, annotations, and bookmarks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub color: UserColor,
}

impl Author {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: UserColor::from_user_id(id),
        }
    }

    pub fn with_color(mut self, color: UserColor) -> Self {
        self.color = color;
        self
    }
}

/// Color assigned to a participant for cursor/annotation highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl UserColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Generate a color based on user ID (deterministic)
    pub fn from_user_id(user_id: UserId) -> Self {
        let bytes = user_id.0.as_bytes();
        Self {
            r: bytes[0],
            g: bytes[1],
            b: bytes[2],
        }
    }

    /// Convert to hex color string
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// What happened at a point in the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Pointer movement in canvas coordinates
    Cursor { x: f64, y: f64 },

    /// Click on a named element
    Click { target: String },

    /// Edit applied to a named element
    Edit { target: String, value: String },

    /// Navigation to another view
    ViewChange { view: String },
}

impl EventPayload {
    /// Short kind name for display and statistics
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::Cursor { .. } => "cursor",
            EventPayload::Click { .. } => "click",
            EventPayload::Edit { .. } => "edit",
            EventPayload::ViewChange { .. } => "view_change",
        }
    }
}

/// Single immutable entry in a session recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub id: EventId,

    /// Absolute wall-clock time the event occurred
    pub timestamp: TimestampMs,

    pub author: Author,

    #[serde(flatten)]
    pub payload: EventPayload,
}

impl SessionEvent {
    pub fn new(timestamp: TimestampMs, author: Author, payload: EventPayload) -> Self {
        Self {
            id: EventId::new(),
            timestamp,
            author,
            payload,
        }
    }
}

/// Ordered, immutable sequence of session events
///
/// Events must already be sorted by timestamp ascending, with
/// simultaneous events keeping their original order. `RecordingBuilder`
/// establishes the ordering at finalization; the log itself never
/// verifies or repairs it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<SessionEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-sorted event list
    pub fn from_sorted(events: Vec<SessionEvent>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionEvent> {
        self.events.iter()
    }

    pub fn first_timestamp(&self) -> Option<TimestampMs> {
        self.events.first().map(|e| e.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<TimestampMs> {
        self.events.last().map(|e| e.timestamp)
    }

    /// Number of events with `timestamp <= ts`, found by binary search
    pub fn prefix_len_through(&self, ts: TimestampMs) -> usize {
        self.events.partition_point(|e| e.timestamp <= ts)
    }

    /// Events with `timestamp <= ts`, as a borrowed prefix slice
    pub fn prefix_through(&self, ts: TimestampMs) -> &[SessionEvent] {
        &self.events[..self.prefix_len_through(ts)]
    }
}
