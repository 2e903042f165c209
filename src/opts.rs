use std::time::Duration;

/// Default polling cadence of the media clock (10 Hz).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Volume used when no earlier lesson set one.
pub const DEFAULT_VOLUME: f64 = 0.7;

/// Step used by the skip-back / skip-forward controls.
pub const DEFAULT_SKIP_SECONDS: f64 = 5.0;

/// Duration assumed for a lesson with no transcript and no usable declared duration.
pub const DEFAULT_FALLBACK_SECONDS: f64 = 30.0;

/// Options that control how lessons are played.
///
/// Library-level configuration, not CLI flags. The CLI maps its flags into this type.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerOpts {
    /// How often a running session samples the media clock.
    pub tick_interval: Duration,

    /// Starting volume for the first lesson. Later lessons inherit the current volume.
    pub default_volume: f64,

    /// How far `Command::SkipBack` / `Command::SkipForward` move, in seconds.
    pub skip_seconds: f64,

    /// Last-resort duration when neither the transcript nor the declared duration is usable.
    pub fallback_seconds: f64,
}

impl Default for PlayerOpts {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            default_volume: DEFAULT_VOLUME,
            skip_seconds: DEFAULT_SKIP_SECONDS,
            fallback_seconds: DEFAULT_FALLBACK_SECONDS,
        }
    }
}
