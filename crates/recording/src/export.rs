/// JSON persistence for recording dumps
use crate::{Result, SessionRecording};
use std::fs;
use std::path::Path;

impl SessionRecording {
    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a recording from a JSON dump
    ///
    /// The dump is trusted: event ordering is the producer's
    /// responsibility, same as for `EventLog::from_sorted`.
    pub fn from_json(json: &str) -> Result<SessionRecording> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write a JSON dump to disk
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a recording from a JSON dump on disk
    pub fn read_json(path: impl AsRef<Path>) -> Result<SessionRecording> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Annotation, Author, Bookmark, EventPayload, RecordingBuilder, UserId};

    #[test]
    fn json_roundtrip_preserves_the_whole_recording() {
        let mut builder = RecordingBuilder::new(1_000);
        let ana = Author::new(UserId::new(), "ana");
        let ben = Author::new(UserId::new(), "ben");
        builder.record(ana.clone(), 2_000, EventPayload::Cursor { x: 10.0, y: 20.0 });
        builder.record(ben.clone(), 3_000, EventPayload::Edit {
            target: "title".into(),
            value: "Q3 revenue".into(),
        });
        let recording = builder.finish(11_000).unwrap();
        let recording = recording
            .create_annotation(
                Annotation::new(recording.id, 2_500, ana.clone(), "renamed early")
                    .with_description("before anyone else joined"),
            )
            .create_bookmark(Bookmark::new(recording.id, 6_000, ben, "midpoint"));

        let json = recording.to_json().unwrap();
        let back = SessionRecording::from_json(&json).unwrap();
        assert_eq!(back, recording);
    }

    #[test]
    fn missing_overlays_default_to_empty() {
        let recording = RecordingBuilder::new(0).finish(10).unwrap();
        let mut value = serde_json::to_value(&recording).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("annotations");
        obj.remove("bookmarks");
        obj.remove("participants");

        let back: SessionRecording = serde_json::from_value(value).unwrap();
        assert!(back.annotations.is_empty());
        assert!(back.bookmarks.is_empty());
        assert!(back.participants.is_empty());
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(SessionRecording::from_json("not json").is_err());
    }
}
