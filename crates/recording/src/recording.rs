/// Finalized session recording: the event log plus its overlays
use crate::{
    Annotation, AnnotationId, Author, Bookmark, BookmarkId, EventLog, RecordingId, TimestampMs,
    UserId,
};
use serde::{Deserialize, Serialize};

/// Immutable record of a collaboration session
///
/// Produced by `RecordingBuilder::finish` or parsed from a JSON dump.
/// The event log never changes after finalization; annotations and
/// bookmarks change only through the copy-on-write operations in
/// `annotations`, which return a new value so hosts can detect changes
/// by identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecording {
    pub id: RecordingId,

    /// Wall-clock time the session began
    pub started_at: TimestampMs,

    /// Wall-clock time the session ended
    pub ended_at: TimestampMs,

    pub events: EventLog,

    /// Unique event authors in first-appearance order
    #[serde(default)]
    pub participants: Vec<Author>,

    #[serde(default)]
    pub annotations: Vec<Annotation>,

    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

impl SessionRecording {
    /// Total length in milliseconds
    pub fn duration_ms(&self) -> TimestampMs {
        self.ended_at - self.started_at
    }

    /// Offset of an absolute timestamp from the recording start
    pub fn offset_ms(&self, ts: TimestampMs) -> TimestampMs {
        ts - self.started_at
    }

    /// Normalized scrubber position of an absolute timestamp, in [0, 1]
    ///
    /// A zero-duration recording maps every timestamp to 0.
    pub fn timeline_position(&self, ts: TimestampMs) -> f64 {
        let duration = self.duration_ms();
        if duration <= 0 {
            return 0.0;
        }
        let position = (ts - self.started_at) as f64 / duration as f64;
        position.clamp(0.0, 1.0)
    }

    pub fn participant(&self, id: UserId) -> Option<&Author> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn bookmark(&self, id: BookmarkId) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.id == id)
    }
}
