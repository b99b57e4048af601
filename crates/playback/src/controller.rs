/// Playback controller: one recording, one clock, one event sink
use crate::{
    live_cursors, visible_len, LiveCursor, PlaybackClock, PlaybackPhase, PlaybackSpeed,
    PlaybackState,
};
use recording::{
    Annotation, Bookmark, SessionEvent, SessionRecording, TimestampMs, UserId,
    PLAYHEAD_TOLERANCE_MS,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Callback invoked as events enter the visible window
pub type EventSink = Box<dyn FnMut(&SessionEvent)>;

/// Drives playback of one recording
///
/// The recording is shared read-only and never mutated here. Hosts
/// drive the controller from their own timer via `tick`; every time
/// change recomputes the visible window before returning, so `state`
/// and `current_events` always agree.
pub struct PlaybackController {
    recording: Arc<SessionRecording>,
    clock: PlaybackClock,
    visible_len: usize,
    sink: Option<EventSink>,
}

impl PlaybackController {
    pub fn new(recording: Arc<SessionRecording>) -> Self {
        let clock = PlaybackClock::new(recording.duration_ms());
        let visible_len = visible_len(&recording.events, recording.started_at, clock.position_ms());
        Self {
            recording,
            clock,
            visible_len,
            sink: None,
        }
    }

    /// Install a callback fired once per event as it enters the window
    ///
    /// Fires on forward movement only (ticks and forward seeks); events
    /// already visible when the sink is installed do not fire, and
    /// events that left the window after a backward seek fire again
    /// when the playhead passes them the next time.
    pub fn with_event_sink(mut self, sink: impl FnMut(&SessionEvent) + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn recording(&self) -> &Arc<SessionRecording> {
        &self.recording
    }

    pub fn state(&self) -> PlaybackState {
        self.clock.state()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.clock.phase()
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.clock.speed()
    }

    /// Virtual playhead in ms from the recording start
    pub fn position_ms(&self) -> f64 {
        self.clock.position_ms()
    }

    /// Progress through the recording, 0 to 100
    pub fn progress(&self) -> f64 {
        self.clock.progress()
    }

    /// Events visible at the current playhead
    pub fn current_events(&self) -> &[SessionEvent] {
        &self.recording.events.events()[..self.visible_len]
    }

    /// Latest cursor per participant at the current playhead
    pub fn live_cursors(&self) -> HashMap<UserId, LiveCursor> {
        live_cursors(self.current_events())
    }

    /// Annotations near the current playhead
    pub fn annotations_at_playhead(&self) -> Vec<&Annotation> {
        self.recording
            .annotations_at(self.absolute_playhead(), PLAYHEAD_TOLERANCE_MS)
    }

    /// Bookmarks near the current playhead
    pub fn bookmarks_at_playhead(&self) -> Vec<&Bookmark> {
        self.recording
            .bookmarks_at(self.absolute_playhead(), PLAYHEAD_TOLERANCE_MS)
    }

    /// Playhead as an absolute wall-clock timestamp
    pub fn absolute_playhead(&self) -> TimestampMs {
        self.recording.started_at + self.clock.position_ms().floor() as TimestampMs
    }

    pub fn play(&mut self) {
        self.clock.play();
        self.resync();
        debug!(position_ms = self.clock.position_ms(), "play");
    }

    pub fn pause(&mut self) {
        self.clock.pause();
        debug!(position_ms = self.clock.position_ms(), "pause");
    }

    pub fn stop(&mut self) {
        self.clock.stop();
        self.resync();
        debug!("stop");
    }

    /// Jump the playhead, clamped into the recording; the phase is
    /// preserved
    pub fn seek(&mut self, position_ms: f64) {
        self.clock.seek(position_ms);
        self.resync();
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.clock.set_speed(speed);
    }

    /// Advance playback by a real elapsed interval from the host timer
    pub fn tick(&mut self, elapsed: Duration) -> PlaybackState {
        let was_playing = self.clock.phase() == PlaybackPhase::Playing;
        self.clock.advance(elapsed.as_secs_f64() * 1_000.0);
        if was_playing && self.clock.phase() == PlaybackPhase::Stopped {
            debug!(position_ms = self.clock.position_ms(), "reached the end");
        }
        self.resync();
        self.state()
    }

    /// Recompute the visible window for the clock's position, firing
    /// the sink for events that just entered
    fn resync(&mut self) {
        let new_len = visible_len(
            &self.recording.events,
            self.recording.started_at,
            self.clock.position_ms(),
        );
        if new_len > self.visible_len {
            if let Some(sink) = self.sink.as_mut() {
                for event in &self.recording.events.events()[self.visible_len..new_len] {
                    sink(event);
                }
            }
        }
        self.visible_len = new_len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recording::{Author, EventPayload, RecordingBuilder};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording() -> Arc<SessionRecording> {
        let mut builder = RecordingBuilder::new(10_000);
        let ana = Author::new(UserId::new(), "ana");
        builder.record(ana.clone(), 11_000, EventPayload::Click { target: "a".into() });
        builder.record(ana.clone(), 13_000, EventPayload::Click { target: "b".into() });
        builder.record(ana, 17_000, EventPayload::Click { target: "c".into() });
        Arc::new(builder.finish(20_000).unwrap())
    }

    fn click_targets(events: &[SessionEvent]) -> Vec<String> {
        events
            .iter()
            .map(|e| match &e.payload {
                EventPayload::Click { target } => target.clone(),
                other => panic!("unexpected payload {other:?}"),
            })
            .collect()
    }

    #[test]
    fn ticking_grows_the_window_monotonically() {
        let mut controller = PlaybackController::new(recording());
        controller.play();
        controller.tick(Duration::from_millis(1_000));
        assert_eq!(click_targets(controller.current_events()), vec!["a"]);

        controller.tick(Duration::from_millis(2_000));
        assert_eq!(click_targets(controller.current_events()), vec!["a", "b"]);

        controller.tick(Duration::from_millis(4_000));
        assert_eq!(click_targets(controller.current_events()), vec!["a", "b", "c"]);
    }

    #[test]
    fn sink_fires_once_per_event_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink_seen = Rc::clone(&seen);
        let mut controller = PlaybackController::new(recording()).with_event_sink(move |event| {
            if let EventPayload::Click { target } = &event.payload {
                sink_seen.borrow_mut().push(target.clone());
            }
        });

        controller.play();
        for _ in 0..10 {
            controller.tick(Duration::from_millis(1_000));
        }
        assert_eq!(*seen.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn forward_seek_fires_skipped_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink_seen = Rc::clone(&seen);
        let mut controller = PlaybackController::new(recording()).with_event_sink(move |event| {
            if let EventPayload::Click { target } = &event.payload {
                sink_seen.borrow_mut().push(target.clone());
            }
        });

        controller.seek(5_000.0);
        assert_eq!(*seen.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn backward_seek_fires_nothing_and_shrinks_the_window() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink_seen = Rc::clone(&seen);
        let mut controller = PlaybackController::new(recording()).with_event_sink(move |event| {
            if let EventPayload::Click { target } = &event.payload {
                sink_seen.borrow_mut().push(target.clone());
            }
        });

        controller.seek(9_000.0);
        seen.borrow_mut().clear();

        controller.seek(1_500.0);
        assert!(seen.borrow().is_empty());
        assert_eq!(click_targets(controller.current_events()), vec!["a"]);
    }

    #[test]
    fn events_reentering_after_a_backward_seek_fire_again() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink_seen = Rc::clone(&seen);
        let mut controller = PlaybackController::new(recording()).with_event_sink(move |event| {
            if let EventPayload::Click { target } = &event.payload {
                sink_seen.borrow_mut().push(target.clone());
            }
        });

        controller.seek(9_000.0);
        controller.seek(0.0);
        controller.seek(5_000.0);
        assert_eq!(*seen.borrow(), vec!["a", "b", "c", "a", "b"]);
    }

    #[test]
    fn window_is_current_immediately_after_seek_returns() {
        let mut controller = PlaybackController::new(recording());
        controller.seek(7_000.0);
        assert_eq!(controller.state().current_time_ms, 7_000.0);
        assert_eq!(controller.current_events().len(), 3);
    }

    #[test]
    fn stop_resets_position_and_window() {
        let mut controller = PlaybackController::new(recording());
        controller.play();
        controller.tick(Duration::from_millis(8_000));
        controller.stop();
        assert_eq!(controller.state().current_time_ms, 0.0);
        assert!(controller.current_events().is_empty());
        assert_eq!(controller.progress(), 0.0);
    }

    #[test]
    fn empty_recording_is_a_permanent_stopped_no_op() {
        let empty = Arc::new(RecordingBuilder::new(0).finish(0).unwrap());
        let mut controller = PlaybackController::new(empty);
        controller.play();
        controller.tick(Duration::from_millis(5_000));
        controller.seek(3_000.0);
        assert_eq!(controller.phase(), PlaybackPhase::Stopped);
        assert!(controller.current_events().is_empty());
        assert_eq!(controller.progress(), 0.0);
    }

    #[test]
    fn double_speed_covers_twice_the_virtual_time() {
        let mut controller = PlaybackController::new(recording());
        controller.set_speed(PlaybackSpeed::Double);
        controller.play();
        controller.tick(Duration::from_millis(2_000));
        assert_eq!(controller.state().current_time_ms, 4_000.0);
        assert_eq!(controller.current_events().len(), 2);
    }

    #[test]
    fn live_cursors_follow_the_playhead() {
        let mut builder = RecordingBuilder::new(0);
        let ana = Author::new(UserId::new(), "ana");
        builder.record(ana.clone(), 100, EventPayload::Cursor { x: 1.0, y: 0.0 });
        builder.record(ana.clone(), 200, EventPayload::Cursor { x: 2.0, y: 0.0 });
        builder.record(ana.clone(), 300, EventPayload::Cursor { x: 3.0, y: 0.0 });
        let mut controller =
            PlaybackController::new(Arc::new(builder.finish(1_000).unwrap()));

        controller.seek(150.0);
        assert_eq!(controller.live_cursors()[&ana.id].x, 1.0);

        // All three in the window: only the newest one counts
        controller.seek(900.0);
        assert_eq!(controller.live_cursors()[&ana.id].x, 3.0);
    }

    #[test]
    fn overlays_near_the_playhead_are_exposed() {
        let base = recording();
        let ana = Author::new(UserId::new(), "ana");
        let with_overlays = base
            .create_annotation(Annotation::new(base.id, 12_000, ana.clone(), "spike"))
            .create_bookmark(Bookmark::new(base.id, 18_000, ana, "wrap-up"));
        let mut controller = PlaybackController::new(Arc::new(with_overlays));

        controller.seek(2_500.0); // playhead at absolute 12_500
        assert_eq!(controller.annotations_at_playhead().len(), 1);
        assert!(controller.bookmarks_at_playhead().is_empty());

        controller.seek(8_500.0); // playhead at absolute 18_500
        assert!(controller.annotations_at_playhead().is_empty());
        assert_eq!(controller.bookmarks_at_playhead().len(), 1);
    }
}
