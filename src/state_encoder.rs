use serde::Serialize;

use crate::Result;
use crate::lesson::Lesson;
use crate::playback::{PlaybackEngine, PlaybackState, Status};
use crate::segments;

/// Everything presentation code needs to render one moment of playback.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateFrame<'a> {
    pub status: Status,
    #[serde(flatten)]
    pub state: &'a PlaybackState,
    /// Text of the highlighted transcript line.
    pub active_text: Option<&'a str>,
}

impl<'a> StateFrame<'a> {
    pub fn from_engine(engine: &'a PlaybackEngine) -> Self {
        Self {
            status: engine.status(),
            state: engine.state(),
            active_text: engine.active_segment().map(|segment| segment.text.as_str()),
        }
    }

    /// Build a frame from a published state, e.g. one received from a running session.
    ///
    /// `lesson` is the lesson the state belongs to, or `None` while idle.
    pub fn from_state(state: &'a PlaybackState, lesson: Option<&'a Lesson>) -> Self {
        let status = match (lesson, state.is_playing) {
            (None, _) => Status::Idle,
            (Some(_), false) => Status::Paused,
            (Some(_), true) => Status::Playing,
        };
        let active_text = lesson
            .zip(state.active_segment_id)
            .and_then(|(lesson, id)| segments::find_by_id(&lesson.transcript, id))
            .map(|segment| segment.text.as_str());

        Self {
            status,
            state,
            active_text,
        }
    }
}

pub trait StateEncoder {
    fn write_state(&mut self, frame: &StateFrame<'_>) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
