//! Lesson values and lesson files.
//!
//! A lesson is an immutable bundle of an audio source reference, an ordered transcript, and
//! the catalog metadata the listening screen shows. Lessons are usually authored as JSON with
//! the same camelCase keys the content team uses:
//!
//! ```json
//! {
//!   "id": 1,
//!   "title": "Ghana's Independence",
//!   "duration": "3:45",
//!   "level": "intermediate",
//!   "audioFile": "/audio/Ghana independence.m4a",
//!   "transcript": [{ "id": 1, "start": 0, "end": 5.5, "text": "..." }]
//! }
//! ```
//!
//! A lesson file holds either one lesson object or an array of them (a catalog).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock_format::parse_clock;
use crate::opts::DEFAULT_FALLBACK_SECONDS;
use crate::segments::{self, TranscriptIssue, TranscriptSegment};
use crate::{Error, Result};

/// Catalog-level lesson identifier.
pub type LessonId = i64;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(default)]
    pub id: LessonId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub level: String,

    /// Declared length as `M:SS`. Only consulted when the transcript cannot provide one.
    #[serde(default, rename = "duration")]
    pub declared_duration: String,

    #[serde(default)]
    pub is_premium: bool,

    /// Reference to the audio the media collaborator should load. Empty means "no audio".
    #[serde(default, rename = "audioFile", alias = "audioUrl")]
    pub audio_source: String,

    /// Ordered transcript. Insertion order is chronological order.
    #[serde(default)]
    pub transcript: Vec<TranscriptSegment>,
}

impl Lesson {
    /// Build a lesson with just the parts the playback engine needs.
    pub fn new(audio_source: impl Into<String>, transcript: Vec<TranscriptSegment>) -> Self {
        Self {
            audio_source: audio_source.into(),
            transcript,
            ..Self::default()
        }
    }

    /// Set the declared `M:SS` duration.
    pub fn with_declared_duration(mut self, duration: impl Into<String>) -> Self {
        self.declared_duration = duration.into();
        self
    }

    /// Whether there is an audio source to play at all.
    pub fn has_audio(&self) -> bool {
        !self.audio_source.trim().is_empty()
    }

    /// The declared duration in seconds, if it parses.
    pub fn declared_seconds(&self) -> Option<f64> {
        parse_clock(&self.declared_duration)
    }

    /// Duration to show before the real media duration is known.
    ///
    /// Tiers, first usable (positive, finite) value wins:
    /// 1. the largest segment `end` in the transcript
    /// 2. the declared `M:SS` duration
    /// 3. `last_resort`, or [`DEFAULT_FALLBACK_SECONDS`] when that is not usable either
    pub fn fallback_duration_seconds(&self, last_resort: f64) -> f64 {
        let usable = |secs: &f64| secs.is_finite() && *secs > 0.0;
        segments::max_end(&self.transcript)
            .filter(usable)
            .or_else(|| self.declared_seconds().filter(usable))
            .or_else(|| Some(last_resort).filter(usable))
            .unwrap_or(DEFAULT_FALLBACK_SECONDS)
    }

    /// Structural problems in the transcript. The engine tolerates all of them.
    pub fn transcript_issues(&self) -> Vec<TranscriptIssue> {
        segments::check_transcript(&self.transcript)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LessonFile {
    Catalog(Vec<Lesson>),
    Single(Box<Lesson>),
}

/// Read lessons from JSON. Accepts a single lesson object or an array of lessons.
pub fn lessons_from_reader<R: Read>(r: R) -> Result<Vec<Lesson>> {
    let file: LessonFile = serde_json::from_reader(r)?;
    Ok(match file {
        LessonFile::Catalog(lessons) => lessons,
        LessonFile::Single(lesson) => vec![*lesson],
    })
}

/// Read lessons from a JSON file on disk.
pub fn load_lessons(path: impl AsRef<Path>) -> Result<Vec<Lesson>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|err| Error::msg(format!("failed to open '{}': {err}", path.display())))?;
    let lessons = lessons_from_reader(BufReader::new(file))?;
    tracing::debug!(path = %path.display(), count = lessons.len(), "loaded lessons");
    Ok(lessons)
}

/// Pick one lesson out of a catalog.
///
/// With `id == None` the catalog must hold exactly one lesson.
pub fn select_lesson(mut lessons: Vec<Lesson>, id: Option<LessonId>) -> Result<Lesson> {
    match id {
        Some(id) => {
            let idx = lessons
                .iter()
                .position(|lesson| lesson.id == id)
                .ok_or_else(|| Error::msg(format!("no lesson with id {id}")))?;
            Ok(lessons.swap_remove(idx))
        }
        None if lessons.len() == 1 => Ok(lessons.remove(0)),
        None if lessons.is_empty() => Err(Error::msg("lesson file is empty")),
        None => Err(Error::msg(format!(
            "lesson file holds {} lessons; pick one by id",
            lessons.len()
        ))),
    }
}
