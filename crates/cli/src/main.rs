use anyhow::Result;
use clap::{Parser, Subcommand};
use playback::{PlaybackController, PlaybackSpeed};
use recording::{
    Annotation, AnnotationCategory, Author, Bookmark, EventPayload, SessionRecording, TimestampMs,
    UserId,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "replay-cli")]
#[command(about = "Session replay toolkit - inspect, annotate and play recorded sessions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a recording dump
    Inspect {
        /// Recording JSON file
        file: PathBuf,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-export a recording as normalized pretty JSON
    Export {
        /// Recording JSON file
        file: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Add an annotation to a recording
    Annotate {
        /// Recording JSON file
        file: PathBuf,

        /// Position in ms from the recording start
        #[arg(long)]
        at: TimestampMs,

        /// Annotation title
        #[arg(long)]
        title: String,

        /// Category (insight, question, issue, suggestion, or free-form)
        #[arg(long)]
        category: Option<String>,

        /// Longer description
        #[arg(long)]
        description: Option<String>,

        /// Author name (reuses a participant with the same name)
        #[arg(long, default_value = "cli")]
        author: String,
    },

    /// Add a bookmark to a recording
    Bookmark {
        /// Recording JSON file
        file: PathBuf,

        /// Position in ms from the recording start
        #[arg(long)]
        at: TimestampMs,

        /// Bookmark label
        #[arg(long)]
        label: String,

        /// Color in hex format (e.g., "#FF0000")
        #[arg(long)]
        color: Option<String>,

        /// Author name (reuses a participant with the same name)
        #[arg(long, default_value = "cli")]
        author: String,
    },

    /// Play a recording in real time, printing events as they appear
    Play {
        /// Recording JSON file
        file: PathBuf,

        /// Speed multiplier (0.5, 1, 1.5, 2)
        #[arg(long, default_value = "1")]
        speed: f64,

        /// Start position in ms from the recording start
        #[arg(long)]
        from: Option<TimestampMs>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Inspect { file, json } => inspect_command(file, json).await,
        Commands::Export { file, output } => export_command(file, output).await,
        Commands::Annotate {
            file,
            at,
            title,
            category,
            description,
            author,
        } => annotate_command(file, at, title, category, description, author).await,
        Commands::Bookmark {
            file,
            at,
            label,
            color,
            author,
        } => bookmark_command(file, at, label, color, author).await,
        Commands::Play { file, speed, from } => play_command(file, speed, from).await,
    }
}

async fn inspect_command(file: PathBuf, as_json: bool) -> Result<()> {
    let recording = SessionRecording::read_json(&file)?;

    let mut kinds: BTreeMap<&'static str, usize> = BTreeMap::new();
    for event in recording.events.iter() {
        *kinds.entry(event.payload.kind()).or_insert(0) += 1;
    }

    if as_json {
        let summary = serde_json::json!({
            "id": recording.id,
            "started_at": recording.started_at,
            "ended_at": recording.ended_at,
            "duration_ms": recording.duration_ms(),
            "events": recording.events.len(),
            "events_by_kind": kinds,
            "participants": recording.participants.iter().map(|p| &p.name).collect::<Vec<_>>(),
            "annotations": recording.annotations.len(),
            "bookmarks": recording.bookmarks.len(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Recording {}", recording.id);
    println!(
        "  span:         {} .. {} ({}ms)",
        format_wallclock(recording.started_at),
        format_wallclock(recording.ended_at),
        recording.duration_ms()
    );
    println!("  events:       {}", recording.events.len());
    for (kind, count) in &kinds {
        println!("    {:<12} {}", kind, count);
    }

    let names: Vec<&str> = recording.participants.iter().map(|p| p.name.as_str()).collect();
    println!("  participants: {}", if names.is_empty() { "none".to_string() } else { names.join(", ") });

    println!("  annotations:  {}", recording.annotations.len());
    for annotation in recording.annotations_sorted() {
        let status = if annotation.resolved { "resolved" } else { "open" };
        println!(
            "    [{:>8}ms] {} ({}, {}, {} replies)",
            recording.offset_ms(annotation.timestamp),
            annotation.title,
            annotation.category,
            status,
            annotation.replies.len()
        );
    }

    println!("  bookmarks:    {}", recording.bookmarks.len());
    for bookmark in recording.bookmarks_sorted() {
        println!(
            "    [{:>8}ms] {} ({})",
            recording.offset_ms(bookmark.timestamp),
            bookmark.label,
            bookmark.color
        );
    }

    Ok(())
}

async fn export_command(file: PathBuf, output: PathBuf) -> Result<()> {
    let recording = SessionRecording::read_json(&file)?;
    recording.write_json(&output)?;
    info!("Exported recording {} to {:?}", recording.id, output);
    Ok(())
}

async fn annotate_command(
    file: PathBuf,
    at: TimestampMs,
    title: String,
    category: Option<String>,
    description: Option<String>,
    author: String,
) -> Result<()> {
    let recording = SessionRecording::read_json(&file)?;
    let author = resolve_author(&recording, &author);
    let timestamp = clamp_into_recording(&recording, at);

    let mut annotation = Annotation::new(recording.id, timestamp, author, title);
    if let Some(category) = category {
        annotation = annotation.with_category(parse_category(&category));
    }
    if let Some(description) = description {
        annotation = annotation.with_description(description);
    }
    let id = annotation.id;

    let updated = recording.create_annotation(annotation);
    updated.write_json(&file)?;

    info!(
        "Added annotation {} at {}ms ({} total)",
        id,
        updated.offset_ms(timestamp),
        updated.annotations.len()
    );
    Ok(())
}

async fn bookmark_command(
    file: PathBuf,
    at: TimestampMs,
    label: String,
    color: Option<String>,
    author: String,
) -> Result<()> {
    let recording = SessionRecording::read_json(&file)?;
    let author = resolve_author(&recording, &author);
    let timestamp = clamp_into_recording(&recording, at);

    let mut bookmark = Bookmark::new(recording.id, timestamp, author, label);
    if let Some(color) = color {
        bookmark = bookmark.with_color(color);
    }
    let id = bookmark.id;

    let updated = recording.create_bookmark(bookmark);
    updated.write_json(&file)?;

    info!(
        "Added bookmark {} at {}ms ({} total)",
        id,
        updated.offset_ms(timestamp),
        updated.bookmarks.len()
    );
    Ok(())
}

async fn play_command(file: PathBuf, speed: f64, from: Option<TimestampMs>) -> Result<()> {
    let recording = SessionRecording::read_json(&file)?;
    info!(
        "Playing recording {} ({} events, {}ms)",
        recording.id,
        recording.events.len(),
        recording.duration_ms()
    );

    let speed = match PlaybackSpeed::from_multiplier(speed) {
        Some(speed) => speed,
        None => {
            warn!("Unsupported speed {}, falling back to 1x", speed);
            PlaybackSpeed::Normal
        }
    };

    let started_at = recording.started_at;
    let mut controller = PlaybackController::new(Arc::new(recording)).with_event_sink(move |event| {
        println!(
            "[{:>8}ms] {:<11} {:<10} {}",
            event.timestamp - started_at,
            event.payload.kind(),
            event.author.name,
            describe_payload(&event.payload)
        );
    });
    controller.set_speed(speed);
    if let Some(from) = from {
        controller.seek(from as f64);
    }
    controller.play();

    // The CLI owns the timer; the engine only sees elapsed intervals
    let mut interval = tokio::time::interval(Duration::from_millis(50));
    let mut last = interval.tick().await;
    loop {
        let now = interval.tick().await;
        let state = controller.tick(now - last);
        last = now;
        if !state.is_playing {
            break;
        }
    }

    info!(
        "Playback finished at {:.0}ms ({:.0}%)",
        controller.state().current_time_ms,
        controller.progress()
    );
    Ok(())
}

/// Reuse a participant identity when the name matches, otherwise mint a
/// fresh one
fn resolve_author(recording: &SessionRecording, name: &str) -> Author {
    recording
        .participants
        .iter()
        .find(|p| p.name == name)
        .cloned()
        .unwrap_or_else(|| Author::new(UserId::new(), name))
}

fn clamp_into_recording(recording: &SessionRecording, at: TimestampMs) -> TimestampMs {
    let timestamp = recording.started_at + at;
    if timestamp < recording.started_at || timestamp > recording.ended_at {
        warn!(
            "Position {}ms is outside the recording, clamping into 0..{}ms",
            at,
            recording.duration_ms()
        );
    }
    timestamp.clamp(recording.started_at, recording.ended_at)
}

fn parse_category(raw: &str) -> AnnotationCategory {
    match raw {
        "insight" => AnnotationCategory::Insight,
        "question" => AnnotationCategory::Question,
        "issue" => AnnotationCategory::Issue,
        "suggestion" => AnnotationCategory::Suggestion,
        other => AnnotationCategory::Custom(other.to_string()),
    }
}

fn describe_payload(payload: &EventPayload) -> String {
    match payload {
        EventPayload::Cursor { x, y } => format!("moved to ({x:.0}, {y:.0})"),
        EventPayload::Click { target } => format!("clicked {target}"),
        EventPayload::Edit { target, value } => format!("set {target} to {value:?}"),
        EventPayload::ViewChange { view } => format!("opened {view}"),
    }
}

fn format_wallclock(ms: TimestampMs) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| format!("{}ms", ms))
}
