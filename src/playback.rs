//! The playback engine: one source of truth for "where are we in this lesson".
//!
//! The engine never touches audio hardware. It is fed position samples from an external media
//! clock (`tick`), reacts to user interactions (seek, jump, skip, volume), and exposes the
//! resulting [`PlaybackState`] for rendering. A driver (see `session`) mirrors play-bit
//! transitions, seeks, and volume changes back onto the real media element.
//!
//! States:
//! - `Idle`: no lesson. Every operation except `load_lesson` is a no-op.
//! - `Paused` / `Playing`: a lesson is loaded. `seek`, `skip`, `set_volume` and `toggle_mute`
//!   never change which of the two we are in.
//!
//! Every operation clamps or ignores bad input. Positions are never negative or NaN, and the
//! reported duration is always positive and finite once a lesson is loaded.

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::command::Command;
use crate::lesson::Lesson;
use crate::opts::PlayerOpts;
use crate::segments::{self, SegmentId, TranscriptSegment};

/// Snapshot of playback for presentation code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub is_playing: bool,
    pub position_seconds: f64,
    /// Real media duration once resolved, the lesson's fallback duration until then.
    pub duration_seconds: f64,
    /// User-selected volume in `[0, 1]`. While muted the output level is 0 regardless.
    pub volume: f64,
    pub is_muted: bool,
    pub active_segment_id: Option<SegmentId>,
}

impl PlaybackState {
    fn idle(volume: f64, is_muted: bool) -> Self {
        Self {
            is_playing: false,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            volume,
            is_muted,
            active_segment_id: None,
        }
    }

    /// The level the media element should actually play at.
    pub fn effective_volume(&self) -> f64 {
        if self.is_muted { 0.0 } else { self.volume }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Paused,
    Playing,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Idle => write!(f, "idle"),
            Status::Paused => write!(f, "paused"),
            Status::Playing => write!(f, "playing"),
        }
    }
}

#[derive(Debug)]
pub struct PlaybackEngine {
    opts: PlayerOpts,
    lesson: Option<Lesson>,
    state: PlaybackState,

    /// Real duration reported by the media collaborator, if any.
    media_duration: Option<f64>,

    /// Volume to come back to when un-muting. Never 0.
    restore_volume: f64,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(PlayerOpts::default())
    }
}

impl PlaybackEngine {
    pub fn new(mut opts: PlayerOpts) -> Self {
        let volume = clamp_volume(opts.default_volume);
        let restore_volume = if volume > 0.0 {
            volume
        } else {
            crate::opts::DEFAULT_VOLUME
        };
        if !(opts.fallback_seconds.is_finite() && opts.fallback_seconds > 0.0) {
            opts.fallback_seconds = crate::opts::DEFAULT_FALLBACK_SECONDS;
        }

        Self {
            state: PlaybackState::idle(volume, volume == 0.0),
            opts,
            lesson: None,
            media_duration: None,
            restore_volume,
        }
    }

    pub fn opts(&self) -> &PlayerOpts {
        &self.opts
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn lesson(&self) -> Option<&Lesson> {
        self.lesson.as_ref()
    }

    /// Duration reported by the media, as opposed to the lesson's fallback.
    pub fn media_duration(&self) -> Option<f64> {
        self.media_duration
    }

    pub fn status(&self) -> Status {
        match (&self.lesson, self.state.is_playing) {
            (None, _) => Status::Idle,
            (Some(_), false) => Status::Paused,
            (Some(_), true) => Status::Playing,
        }
    }

    /// The transcript segment currently highlighted, if any.
    pub fn active_segment(&self) -> Option<&TranscriptSegment> {
        let lesson = self.lesson.as_ref()?;
        let id = self.state.active_segment_id?;
        segments::find_by_id(&lesson.transcript, id)
    }

    /// Start a fresh playback of `lesson`, replacing whatever was loaded.
    ///
    /// Position, play bit and highlight reset; volume and mute carry over. A lesson without an
    /// audio source leaves the engine idle, and the caller is expected to render a placeholder.
    pub fn load_lesson(&mut self, lesson: Lesson) -> &PlaybackState {
        let volume = self.state.volume;
        let is_muted = self.state.is_muted;
        self.state = PlaybackState::idle(volume, is_muted);
        self.media_duration = None;

        if !lesson.has_audio() {
            debug!(lesson_id = lesson.id, "lesson has no audio source; staying idle");
            self.lesson = None;
            return &self.state;
        }

        for issue in lesson.transcript_issues() {
            warn!(lesson_id = lesson.id, %issue, "tolerating malformed transcript");
        }

        self.state.duration_seconds = lesson.fallback_duration_seconds(self.opts.fallback_seconds);
        debug!(
            lesson_id = lesson.id,
            segments = lesson.transcript.len(),
            fallback_duration = self.state.duration_seconds,
            "lesson loaded"
        );
        self.lesson = Some(lesson);
        &self.state
    }

    /// Drop the current lesson and return to idle. Volume settings are kept.
    pub fn unload(&mut self) {
        if self.lesson.take().is_some() {
            debug!("lesson unloaded");
        }
        self.state = PlaybackState::idle(self.state.volume, self.state.is_muted);
        self.media_duration = None;
    }

    /// Record the real media duration. Non-positive or non-finite values are ignored.
    pub fn on_duration_resolved(&mut self, seconds: f64) {
        if self.lesson.is_none() {
            return;
        }
        if !(seconds.is_finite() && seconds > 0.0) {
            debug!(seconds, "ignoring unusable media duration");
            return;
        }

        self.media_duration = Some(seconds);
        self.state.duration_seconds = seconds;
        if self.state.position_seconds > seconds {
            self.state.position_seconds = seconds;
            self.resolve_active_segment();
        }
    }

    /// Take a position sample from the media clock and update the highlight.
    ///
    /// The sample is trusted as-is apart from flooring at 0 (non-finite samples are dropped);
    /// the media clock is authoritative for where playback actually is.
    pub fn tick(&mut self, media_time_seconds: f64) {
        if self.lesson.is_none() || !media_time_seconds.is_finite() {
            return;
        }

        self.state.position_seconds = media_time_seconds.max(0.0);
        self.resolve_active_segment();
        trace!(
            position = self.state.position_seconds,
            active = ?self.state.active_segment_id,
            "tick"
        );
    }

    /// Move to `target_seconds`, clamped to `[0, duration]`, and update the highlight now.
    pub fn seek(&mut self, target_seconds: f64) {
        if self.lesson.is_none() || target_seconds.is_nan() {
            return;
        }

        let position = target_seconds.clamp(0.0, self.duration());
        self.state.position_seconds = position;
        self.resolve_active_segment();
        debug!(position, active = ?self.state.active_segment_id, "seek");
    }

    /// Seek to the start of a segment and make sure it is heard.
    ///
    /// Resumes playback if paused; while playing only the position changes. Unknown ids are
    /// ignored.
    pub fn jump_to_segment(&mut self, segment_id: SegmentId) {
        let Some(lesson) = self.lesson.as_ref() else {
            return;
        };
        let Some(start) = segments::find_by_id(&lesson.transcript, segment_id).map(|s| s.start)
        else {
            debug!(segment_id, "jump to unknown segment ignored");
            return;
        };

        self.seek(start);
        if !self.state.is_playing {
            self.state.is_playing = true;
            debug!(segment_id, "resuming playback after segment jump");
        }
    }

    /// Move relative to the current position. Clamping is left to `seek`.
    pub fn skip(&mut self, delta_seconds: f64) {
        let target = self.state.position_seconds + delta_seconds;
        self.seek(target);
    }

    /// Set the volume, clamped to `[0, 1]`. Zero mutes; anything above zero un-mutes.
    pub fn set_volume(&mut self, volume: f64) {
        if self.lesson.is_none() || volume.is_nan() {
            return;
        }

        let volume = clamp_volume(volume);
        self.state.volume = volume;
        self.state.is_muted = volume == 0.0;
        if volume > 0.0 {
            self.restore_volume = volume;
        }
    }

    /// Mute, or un-mute back to the last audible volume.
    pub fn toggle_mute(&mut self) {
        if self.lesson.is_none() {
            return;
        }

        if self.state.is_muted {
            self.state.is_muted = false;
            if self.state.volume == 0.0 {
                self.state.volume = self.restore_volume;
            }
        } else {
            if self.state.volume > 0.0 {
                self.restore_volume = self.state.volume;
            }
            self.state.is_muted = true;
        }
        debug!(muted = self.state.is_muted, volume = self.state.volume, "mute toggled");
    }

    /// Flip the play bit. The position only moves when the media clock ticks.
    pub fn toggle_play_pause(&mut self) {
        if self.lesson.is_none() {
            return;
        }
        self.set_playing(!self.state.is_playing);
    }

    /// The media collaborator started (or should start) playing.
    pub fn request_play(&mut self) {
        if self.lesson.is_some() {
            self.set_playing(true);
        }
    }

    /// The media collaborator paused (or should pause).
    pub fn request_pause(&mut self) {
        if self.lesson.is_some() {
            self.set_playing(false);
        }
    }

    /// The media reached its end.
    pub fn on_media_ended(&mut self) {
        if self.lesson.is_some() && self.state.is_playing {
            debug!("media ended");
            self.set_playing(false);
        }
    }

    /// Dispatch a typed command to the matching operation.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Load(lesson) => {
                self.load_lesson(*lesson);
            }
            Command::Unload => self.unload(),
            Command::Tick(t) => self.tick(t),
            Command::DurationResolved(secs) => self.on_duration_resolved(secs),
            Command::Seek(t) => self.seek(t),
            Command::Skip(delta) => self.skip(delta),
            Command::SkipBack => self.skip(-self.opts.skip_seconds),
            Command::SkipForward => self.skip(self.opts.skip_seconds),
            Command::JumpToSegment(id) => self.jump_to_segment(id),
            Command::SetVolume(v) => self.set_volume(v),
            Command::ToggleMute => self.toggle_mute(),
            Command::TogglePlayPause => self.toggle_play_pause(),
            Command::RequestPlay => self.request_play(),
            Command::RequestPause => self.request_pause(),
            Command::MediaEnded => self.on_media_ended(),
        }
    }

    fn duration(&self) -> f64 {
        self.media_duration.unwrap_or(self.state.duration_seconds)
    }

    fn set_playing(&mut self, playing: bool) {
        if self.state.is_playing != playing {
            self.state.is_playing = playing;
            debug!(status = %self.status(), "playback status changed");
        }
    }

    /// First match wins; a miss keeps the previous highlight so gaps don't flicker.
    fn resolve_active_segment(&mut self) {
        let Some(lesson) = self.lesson.as_ref() else {
            return;
        };
        if let Some(segment) = segments::find_active(&lesson.transcript, self.state.position_seconds)
        {
            self.state.active_segment_id = Some(segment.id);
        }
    }
}

fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0)
}
