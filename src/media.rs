//! The media clock: the external, real-time position source a session polls.
//!
//! The engine never reads time itself. A session samples a [`MediaClock`] on every tick and
//! pushes play/pause, seeks, and volume changes back into it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// A playing (or paused) piece of media.
///
/// Implementations wrap whatever actually produces sound. Positions and durations are seconds.
pub trait MediaClock: Send {
    /// Start playing a new source from the beginning, paused.
    ///
    /// Anything learned about the previous source, its duration included, is dropped.
    fn load(&mut self, source: &str);

    /// Current playback position.
    fn position(&self) -> f64;

    /// Real duration of the currently loaded source, once the media knows it.
    fn duration(&self) -> Option<f64>;

    /// Whether playback ran off the end of the media.
    fn has_ended(&self) -> bool;

    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);

    /// Output level in `[0, 1]`.
    fn set_volume(&mut self, volume: f64);
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ManualInner {
    source: String,
    position: f64,
    duration: Option<f64>,
    /// Duration the next loaded source reports.
    next_duration: Option<f64>,
    playing: bool,
    ended: bool,
    volume: f64,
}

/// A clock that only moves when told to.
///
/// Clones share state, so a test can hand one clone to a session and keep another to
/// [`advance`](ManualClock::advance) time and inspect what the session did.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualInner>>,
}

impl ManualClock {
    /// `duration` is what the current source and the first loaded source report. Sources
    /// loaded after that report none until [`set_duration`](ManualClock::set_duration).
    pub fn new(duration: Option<f64>) -> Self {
        let clock = Self::default();
        {
            let mut inner = clock.lock();
            inner.duration = duration;
            inner.next_duration = duration;
        }
        clock
    }

    /// Let `seconds` of media time pass. Only moves while playing; stops at the end.
    pub fn advance(&self, seconds: f64) {
        let mut inner = self.lock();
        if !inner.playing {
            return;
        }

        inner.position += seconds.max(0.0);
        if let Some(duration) = inner.duration {
            if inner.position >= duration {
                inner.position = duration;
                inner.playing = false;
                inner.ended = true;
            }
        }
    }

    /// Report the real duration, as a media element does once metadata loads.
    pub fn set_duration(&self, seconds: f64) {
        self.lock().duration = Some(seconds);
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    pub fn volume(&self) -> f64 {
        self.lock().volume
    }

    pub fn source(&self) -> String {
        self.lock().source.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MediaClock for ManualClock {
    fn load(&mut self, source: &str) {
        let mut inner = self.lock();
        inner.source = source.to_owned();
        inner.duration = inner.next_duration.take();
        inner.position = 0.0;
        inner.playing = false;
        inner.ended = false;
    }

    fn position(&self) -> f64 {
        self.lock().position
    }

    fn duration(&self) -> Option<f64> {
        self.lock().duration
    }

    fn has_ended(&self) -> bool {
        self.lock().ended
    }

    fn play(&mut self) {
        let mut inner = self.lock();
        inner.playing = true;
        inner.ended = false;
    }

    fn pause(&mut self) {
        self.lock().playing = false;
    }

    fn seek(&mut self, seconds: f64) {
        let mut inner = self.lock();
        inner.position = seconds.max(0.0);
        inner.ended = false;
    }

    fn set_volume(&mut self, volume: f64) {
        self.lock().volume = volume;
    }
}

/// A clock that advances with wall time while playing.
///
/// Stands in for a real media element in demos: it "plays" a source of a known length at
/// `rate` times real time without producing any sound.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    duration: Option<f64>,
    /// Duration the next loaded source reports.
    next_duration: Option<f64>,
    rate: f64,
    volume: f64,

    /// Position at `anchor`.
    anchor_position: f64,
    /// When playback last (re)started; `None` while paused.
    anchor: Option<Instant>,
}

impl SimulatedClock {
    /// `duration` is the length of the current source and of the first one loaded.
    pub fn new(duration: Option<f64>, rate: f64) -> Self {
        Self {
            duration,
            next_duration: duration,
            rate: if rate.is_finite() && rate > 0.0 { rate } else { 1.0 },
            volume: 0.0,
            anchor_position: 0.0,
            anchor: None,
        }
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    fn raw_position(&self) -> f64 {
        match self.anchor {
            Some(anchor) => self.anchor_position + anchor.elapsed().as_secs_f64() * self.rate,
            None => self.anchor_position,
        }
    }
}

impl MediaClock for SimulatedClock {
    fn load(&mut self, _source: &str) {
        self.duration = self.next_duration.take();
        self.anchor_position = 0.0;
        self.anchor = None;
    }

    fn position(&self) -> f64 {
        let position = self.raw_position();
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn has_ended(&self) -> bool {
        matches!(self.duration, Some(duration) if self.raw_position() >= duration)
    }

    fn play(&mut self) {
        if self.anchor.is_none() {
            if self.has_ended() {
                self.anchor_position = 0.0;
            }
            self.anchor = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.anchor_position = self.position();
        self.anchor = None;
    }

    fn seek(&mut self, seconds: f64) {
        self.anchor_position = seconds.max(0.0);
        if self.anchor.is_some() {
            self.anchor = Some(Instant::now());
        }
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }
}
