/// Builds a finalized recording from a live event buffer
use crate::{
    Author, EventId, EventLog, EventPayload, RecordingError, RecordingId, Result, SessionEvent,
    SessionRecording, TimestampMs,
};

/// Accumulates session events until the session ends
///
/// Events may arrive in any order (network jitter, batched flushes);
/// `finish` establishes the timestamp ordering the rest of the system
/// relies on.
#[derive(Debug, Clone)]
pub struct RecordingBuilder {
    id: RecordingId,
    started_at: TimestampMs,
    events: Vec<SessionEvent>,
}

impl RecordingBuilder {
    pub fn new(started_at: TimestampMs) -> Self {
        Self {
            id: RecordingId::new(),
            started_at,
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> RecordingId {
        self.id
    }

    pub fn started_at(&self) -> TimestampMs {
        self.started_at
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Buffer a new event, returning its id
    pub fn record(
        &mut self,
        author: Author,
        timestamp: TimestampMs,
        payload: EventPayload,
    ) -> EventId {
        let event = SessionEvent::new(timestamp, author, payload);
        let id = event.id;
        self.events.push(event);
        id
    }

    /// Buffer an event constructed elsewhere
    pub fn record_event(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    /// Finalize the buffer into an immutable recording
    ///
    /// Sorts events by timestamp (stable, so simultaneous events keep
    /// arrival order), validates that every event falls inside the
    /// recording bounds, and derives the participant list from event
    /// authors in first-appearance order.
    pub fn finish(self, ended_at: TimestampMs) -> Result<SessionRecording> {
        if ended_at < self.started_at {
            return Err(RecordingError::NegativeDuration {
                started_at: self.started_at,
                ended_at,
            });
        }

        let mut events = self.events;
        events.sort_by_key(|e| e.timestamp);

        if let Some(event) = events
            .iter()
            .find(|e| e.timestamp < self.started_at || e.timestamp > ended_at)
        {
            return Err(RecordingError::EventOutOfBounds(event.id, event.timestamp));
        }

        let mut participants: Vec<Author> = Vec::new();
        for event in &events {
            if !participants.iter().any(|p| p.id == event.author.id) {
                participants.push(event.author.clone());
            }
        }

        Ok(SessionRecording {
            id: self.id,
            started_at: self.started_at,
            ended_at,
            events: EventLog::from_sorted(events),
            participants,
            annotations: Vec::new(),
            bookmarks: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserId;

    #[test]
    fn finish_sorts_events_by_timestamp() {
        let mut builder = RecordingBuilder::new(0);
        let ana = Author::new(UserId::new(), "ana");
        builder.record(ana.clone(), 300, EventPayload::Click { target: "c".into() });
        builder.record(ana.clone(), 100, EventPayload::Click { target: "a".into() });
        builder.record(ana, 200, EventPayload::Click { target: "b".into() });

        let recording = builder.finish(1_000).unwrap();
        let timestamps: Vec<_> = recording.events.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![100, 200, 300]);
    }

    #[test]
    fn finish_keeps_arrival_order_for_simultaneous_events() {
        let mut builder = RecordingBuilder::new(0);
        let ana = Author::new(UserId::new(), "ana");
        let first = builder.record(ana.clone(), 100, EventPayload::Click { target: "a".into() });
        let second = builder.record(ana, 100, EventPayload::Click { target: "b".into() });

        let recording = builder.finish(1_000).unwrap();
        assert_eq!(recording.events.events()[0].id, first);
        assert_eq!(recording.events.events()[1].id, second);
    }

    #[test]
    fn finish_derives_participants_in_first_appearance_order() {
        let mut builder = RecordingBuilder::new(0);
        let ana = Author::new(UserId::new(), "ana");
        let ben = Author::new(UserId::new(), "ben");
        builder.record(ana.clone(), 10, EventPayload::Cursor { x: 1.0, y: 1.0 });
        builder.record(ben.clone(), 20, EventPayload::Cursor { x: 2.0, y: 2.0 });
        builder.record(ana.clone(), 30, EventPayload::Cursor { x: 3.0, y: 3.0 });

        let recording = builder.finish(100).unwrap();
        assert_eq!(recording.participants.len(), 2);
        assert_eq!(recording.participants[0].id, ana.id);
        assert_eq!(recording.participants[1].id, ben.id);
    }

    #[test]
    fn finish_rejects_end_before_start() {
        let builder = RecordingBuilder::new(500);
        let err = builder.finish(400).unwrap_err();
        assert!(matches!(err, RecordingError::NegativeDuration { .. }));
    }

    #[test]
    fn finish_rejects_events_outside_bounds() {
        let mut builder = RecordingBuilder::new(100);
        let ana = Author::new(UserId::new(), "ana");
        builder.record(ana, 50, EventPayload::Click { target: "early".into() });
        let err = builder.finish(200).unwrap_err();
        assert!(matches!(err, RecordingError::EventOutOfBounds(_, 50)));
    }

    #[test]
    fn empty_builder_finishes_into_empty_recording() {
        let recording = RecordingBuilder::new(100).finish(100).unwrap();
        assert!(recording.events.is_empty());
        assert!(recording.participants.is_empty());
        assert_eq!(recording.duration_ms(), 0);
    }
}
