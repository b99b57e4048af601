/// Virtual-time playback clock
///
/// Pure state machine: the host owns the timer and reports real elapsed
/// time through `advance`; the clock only performs transitions. Virtual
/// position is milliseconds relative to the recording start.
use recording::TimestampMs;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Playback rate multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackSpeed {
    Half,
    Normal,
    OneAndHalf,
    Double,
}

impl PlaybackSpeed {
    pub const ALL: [PlaybackSpeed; 4] = [
        PlaybackSpeed::Half,
        PlaybackSpeed::Normal,
        PlaybackSpeed::OneAndHalf,
        PlaybackSpeed::Double,
    ];

    pub fn multiplier(&self) -> f64 {
        match self {
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::OneAndHalf => 1.5,
            PlaybackSpeed::Double => 2.0,
        }
    }

    /// Supported speed for an exact multiplier, if any
    pub fn from_multiplier(value: f64) -> Option<Self> {
        PlaybackSpeed::ALL
            .into_iter()
            .find(|s| s.multiplier() == value)
    }
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self::Normal
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackSpeed::Half => write!(f, "0.5x"),
            PlaybackSpeed::Normal => write!(f, "1x"),
            PlaybackSpeed::OneAndHalf => write!(f, "1.5x"),
            PlaybackSpeed::Double => write!(f, "2x"),
        }
    }
}

/// Playback phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    Stopped,
    Playing,
    Paused,
}

impl PlaybackPhase {
    /// Whether a playhead position is being held (paused) or moving
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackPhase::Playing | PlaybackPhase::Paused)
    }
}

/// Snapshot of the clock for hosts, serializable so hosts can persist
/// it through their own storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Virtual position in ms from the recording start
    pub current_time_ms: f64,
    pub is_playing: bool,
    pub is_paused: bool,
    pub speed: PlaybackSpeed,
}

/// Clock over one recording's duration
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    duration_ms: TimestampMs,
    phase: PlaybackPhase,
    position_ms: f64,
    speed: PlaybackSpeed,
}

impl PlaybackClock {
    pub fn new(duration_ms: TimestampMs) -> Self {
        Self {
            duration_ms: duration_ms.max(0),
            phase: PlaybackPhase::Stopped,
            position_ms: 0.0,
            speed: PlaybackSpeed::Normal,
        }
    }

    pub fn duration_ms(&self) -> TimestampMs {
        self.duration_ms
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    /// Virtual position in ms from the recording start
    pub fn position_ms(&self) -> f64 {
        self.position_ms
    }

    /// Start or resume playback
    ///
    /// After a run-to-end the position is parked at the duration;
    /// playing again restarts from 0. A zero-duration clock has
    /// nothing to play and stays Stopped.
    pub fn play(&mut self) {
        if self.duration_ms == 0 {
            return;
        }
        if self.phase == PlaybackPhase::Stopped && self.position_ms >= self.duration_ms as f64 {
            self.position_ms = 0.0;
        }
        self.phase = PlaybackPhase::Playing;
    }

    /// Freeze the position for a later resume
    pub fn pause(&mut self) {
        if self.phase == PlaybackPhase::Playing {
            self.phase = PlaybackPhase::Paused;
        }
    }

    /// Halt playback and rewind to the start
    pub fn stop(&mut self) {
        self.phase = PlaybackPhase::Stopped;
        self.position_ms = 0.0;
    }

    /// Jump to a position, clamped into [0, duration]
    ///
    /// Works in every phase and never changes the phase: seeking while
    /// paused stays paused, seeking while playing keeps playing from
    /// the new position.
    pub fn seek(&mut self, position_ms: f64) {
        self.position_ms = position_ms.clamp(0.0, self.duration_ms as f64);
    }

    /// Change the rate; takes effect from the next `advance`
    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    /// Advance virtual time by a real elapsed interval
    ///
    /// Only a Playing clock moves: `position += elapsed * multiplier`.
    /// Reaching the end stops playback with the position parked at the
    /// duration. Returns the phase after the step.
    pub fn advance(&mut self, real_elapsed_ms: f64) -> PlaybackPhase {
        if self.phase != PlaybackPhase::Playing || real_elapsed_ms <= 0.0 {
            return self.phase;
        }
        self.position_ms += real_elapsed_ms * self.speed.multiplier();
        let end = self.duration_ms as f64;
        if self.position_ms >= end {
            self.position_ms = end;
            self.phase = PlaybackPhase::Stopped;
        }
        self.phase
    }

    /// Progress through the recording as a percentage; 0 for an empty
    /// recording
    pub fn progress(&self) -> f64 {
        if self.duration_ms <= 0 {
            return 0.0;
        }
        (self.position_ms / self.duration_ms as f64) * 100.0
    }

    /// Snapshot for hosts
    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_time_ms: self.position_ms,
            is_playing: self.phase == PlaybackPhase::Playing,
            is_paused: self.phase == PlaybackPhase::Paused,
            speed: self.speed,
        }
    }
}
