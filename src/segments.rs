//! Transcript segments and active-segment resolution.

use serde::{Deserialize, Serialize};

/// Stable identifier of a transcript segment.
///
/// Ids are unique within a lesson but not necessarily contiguous.
pub type SegmentId = i64;

/// One line of a lesson transcript: a time interval of the audio plus its display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub id: SegmentId,
    /// Start of the interval, in seconds.
    pub start: f64,
    /// End of the interval, in seconds.
    pub end: f64,
    #[serde(default)]
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(id: SegmentId, start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            id,
            start,
            end,
            text: text.into(),
        }
    }

    /// Whether `position` falls inside this segment. Both bounds are inclusive.
    pub fn contains(&self, position: f64) -> bool {
        self.start <= position && position <= self.end
    }
}

/// Find the segment that should be highlighted at `position`.
///
/// Returns the **first** segment in transcript order whose closed interval contains `position`.
/// At a shared boundary (`a.end == b.start`) the earlier segment wins, and with overlapping
/// input the earliest listed segment wins. Returns `None` for gaps, an empty transcript, or a
/// NaN position.
pub fn find_active(transcript: &[TranscriptSegment], position: f64) -> Option<&TranscriptSegment> {
    transcript.iter().find(|segment| segment.contains(position))
}

/// Look up a segment by id. With duplicate ids, the first one wins.
pub fn find_by_id(transcript: &[TranscriptSegment], id: SegmentId) -> Option<&TranscriptSegment> {
    transcript.iter().find(|segment| segment.id == id)
}

/// Largest finite `end` across the transcript, if any.
pub fn max_end(transcript: &[TranscriptSegment]) -> Option<f64> {
    transcript
        .iter()
        .map(|segment| segment.end)
        .filter(|end| end.is_finite())
        .reduce(f64::max)
}

/// A structural problem in a transcript.
///
/// These are diagnostics only. The engine tolerates every one of them.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptIssue {
    /// `start` or `end` is negative or not finite.
    InvalidBounds { id: SegmentId },
    /// `end <= start`.
    Empty { id: SegmentId },
    /// The segment starts before the previous one.
    Unsorted { id: SegmentId, previous: SegmentId },
    /// The segment starts before the previous one ends.
    Overlap { id: SegmentId, previous: SegmentId },
    /// The id was already used by an earlier segment.
    DuplicateId { id: SegmentId },
}

impl std::fmt::Display for TranscriptIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBounds { id } => write!(f, "segment {id} has invalid bounds"),
            Self::Empty { id } => write!(f, "segment {id} has zero or negative length"),
            Self::Unsorted { id, previous } => {
                write!(f, "segment {id} starts before segment {previous}")
            }
            Self::Overlap { id, previous } => write!(f, "segment {id} overlaps segment {previous}"),
            Self::DuplicateId { id } => write!(f, "segment id {id} is used more than once"),
        }
    }
}

/// Check a transcript for structural problems.
///
/// Adjacent segments sharing a boundary (`previous.end == next.start`) are not an overlap.
pub fn check_transcript(transcript: &[TranscriptSegment]) -> Vec<TranscriptIssue> {
    let mut issues = Vec::new();
    let mut seen_ids = std::collections::HashSet::new();
    let mut previous: Option<&TranscriptSegment> = None;

    for segment in transcript {
        if !seen_ids.insert(segment.id) {
            issues.push(TranscriptIssue::DuplicateId { id: segment.id });
        }

        let bounds_ok = segment.start.is_finite()
            && segment.end.is_finite()
            && segment.start >= 0.0
            && segment.end >= 0.0;
        if !bounds_ok {
            issues.push(TranscriptIssue::InvalidBounds { id: segment.id });
            continue;
        }

        if segment.end <= segment.start {
            issues.push(TranscriptIssue::Empty { id: segment.id });
        }

        if let Some(prev) = previous {
            if segment.start < prev.start {
                issues.push(TranscriptIssue::Unsorted {
                    id: segment.id,
                    previous: prev.id,
                });
            } else if segment.start < prev.end {
                issues.push(TranscriptIssue::Overlap {
                    id: segment.id,
                    previous: prev.id,
                });
            }
        }
        previous = Some(segment);
    }

    issues
}
