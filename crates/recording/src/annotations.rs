/// Annotation and bookmark overlay for session recordings
///
/// All mutations are copy-on-write: each operation returns a new
/// `SessionRecording` so hosts can detect changes by identity. Unknown
/// ids are a no-op copy; creator-only delete rules are enforced by the
/// calling layer, not here.
use crate::{
    AnnotationId, Author, BookmarkId, RecordingId, ReplyId, SessionRecording, TimestampMs, UserId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How close an annotation or bookmark must be to the playhead to be
/// shown as "current", in milliseconds
pub const PLAYHEAD_TOLERANCE_MS: TimestampMs = 1_000;

/// Annotation category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationCategory {
    Insight,
    Question,
    Issue,
    Suggestion,
    Custom(String),
}

impl Default for AnnotationCategory {
    fn default() -> Self {
        Self::Insight
    }
}

impl fmt::Display for AnnotationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationCategory::Insight => write!(f, "insight"),
            AnnotationCategory::Question => write!(f, "question"),
            AnnotationCategory::Issue => write!(f, "issue"),
            AnnotationCategory::Suggestion => write!(f, "suggestion"),
            AnnotationCategory::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Timestamped note pinned to a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub recording_id: RecordingId,

    /// Absolute timestamp on the recording timeline
    pub timestamp: TimestampMs,

    pub author: Author,
    pub title: String,

    #[serde(default)]
    pub category: AnnotationCategory,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub resolved: bool,

    /// Who resolved it, set together with `resolved_at`
    #[serde(default)]
    pub resolved_by: Option<UserId>,

    #[serde(default)]
    pub resolved_at: Option<TimestampMs>,

    #[serde(default)]
    pub replies: Vec<AnnotationReply>,
}

impl Annotation {
    pub fn new(
        recording_id: RecordingId,
        timestamp: TimestampMs,
        author: Author,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: AnnotationId::new(),
            recording_id,
            timestamp,
            author,
            title: title.into(),
            category: AnnotationCategory::default(),
            description: None,
            resolved: false,
            resolved_by: None,
            resolved_at: None,
            replies: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: AnnotationCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Threaded reply on an annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationReply {
    pub id: ReplyId,
    pub author: Author,
    pub text: String,

    /// Wall-clock time the reply was written
    pub created_at: TimestampMs,
}

impl AnnotationReply {
    pub fn new(author: Author, text: impl Into<String>) -> Self {
        Self {
            id: ReplyId::new(),
            author,
            text: text.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Named jump target on the recording timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub recording_id: RecordingId,

    /// Absolute timestamp on the recording timeline
    pub timestamp: TimestampMs,

    pub author: Author,
    pub label: String,

    /// Color in hex format (e.g., "#FF0000")
    #[serde(default = "default_bookmark_color")]
    pub color: String,
}

fn default_bookmark_color() -> String {
    "#F5A623".to_string() // Amber
}

impl Bookmark {
    pub fn new(
        recording_id: RecordingId,
        timestamp: TimestampMs,
        author: Author,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: BookmarkId::new(),
            recording_id,
            timestamp,
            author,
            label: label.into(),
            color: default_bookmark_color(),
        }
    }

    pub fn with_color(mut self, color: String) -> Self {
        self.color = color;
        self
    }
}

impl SessionRecording {
    /// Append an annotation
    pub fn create_annotation(&self, annotation: Annotation) -> SessionRecording {
        let mut next = self.clone();
        next.annotations.push(annotation);
        next
    }

    /// Remove an annotation and its replies
    pub fn delete_annotation(&self, id: AnnotationId) -> SessionRecording {
        let mut next = self.clone();
        next.annotations.retain(|a| a.id != id);
        next
    }

    /// Mark an annotation resolved, recording who and when
    pub fn resolve_annotation(&self, id: AnnotationId, resolved_by: UserId) -> SessionRecording {
        let mut next = self.clone();
        if let Some(annotation) = next.annotations.iter_mut().find(|a| a.id == id) {
            annotation.resolved = true;
            annotation.resolved_by = Some(resolved_by);
            annotation.resolved_at = Some(chrono::Utc::now().timestamp_millis());
        }
        next
    }

    /// Reopen an annotation, clearing the resolution metadata
    pub fn unresolve_annotation(&self, id: AnnotationId) -> SessionRecording {
        let mut next = self.clone();
        if let Some(annotation) = next.annotations.iter_mut().find(|a| a.id == id) {
            annotation.resolved = false;
            annotation.resolved_by = None;
            annotation.resolved_at = None;
        }
        next
    }

    /// Append a reply to an annotation's thread
    pub fn add_reply(&self, annotation_id: AnnotationId, reply: AnnotationReply) -> SessionRecording {
        let mut next = self.clone();
        if let Some(annotation) = next.annotations.iter_mut().find(|a| a.id == annotation_id) {
            annotation.replies.push(reply);
        }
        next
    }

    /// Remove a reply from an annotation's thread
    pub fn delete_reply(&self, annotation_id: AnnotationId, reply_id: ReplyId) -> SessionRecording {
        let mut next = self.clone();
        if let Some(annotation) = next.annotations.iter_mut().find(|a| a.id == annotation_id) {
            annotation.replies.retain(|r| r.id != reply_id);
        }
        next
    }

    /// Append a bookmark
    pub fn create_bookmark(&self, bookmark: Bookmark) -> SessionRecording {
        let mut next = self.clone();
        next.bookmarks.push(bookmark);
        next
    }

    /// Remove a bookmark
    pub fn delete_bookmark(&self, id: BookmarkId) -> SessionRecording {
        let mut next = self.clone();
        next.bookmarks.retain(|b| b.id != id);
        next
    }

    /// Annotations sorted by timeline position
    pub fn annotations_sorted(&self) -> Vec<&Annotation> {
        let mut annotations: Vec<_> = self.annotations.iter().collect();
        annotations.sort_by_key(|a| a.timestamp);
        annotations
    }

    /// Bookmarks sorted by timeline position
    pub fn bookmarks_sorted(&self) -> Vec<&Bookmark> {
        let mut bookmarks: Vec<_> = self.bookmarks.iter().collect();
        bookmarks.sort_by_key(|b| b.timestamp);
        bookmarks
    }

    /// Annotations within `tolerance` of the playhead, strict on the
    /// boundary so an annotation exactly `tolerance` away is not "at"
    /// the playhead
    pub fn annotations_at(&self, playhead: TimestampMs, tolerance: TimestampMs) -> Vec<&Annotation> {
        self.annotations
            .iter()
            .filter(|a| (a.timestamp - playhead).abs() < tolerance)
            .collect()
    }

    /// Bookmarks within `tolerance` of the playhead
    pub fn bookmarks_at(&self, playhead: TimestampMs, tolerance: TimestampMs) -> Vec<&Bookmark> {
        self.bookmarks
            .iter()
            .filter(|b| (b.timestamp - playhead).abs() < tolerance)
            .collect()
    }
}
