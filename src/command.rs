//! Typed playback commands and their one-line text form.
//!
//! Every engine operation has a `Command` so that user interactions, media events, and
//! scripted test runs all flow through [`crate::playback::PlaybackEngine::apply`].
//!
//! Text form, one command per line (case-insensitive keywords, `#` starts a comment):
//!
//! | line             | command                        |
//! |------------------|--------------------------------|
//! | `play`           | `RequestPlay`                  |
//! | `pause`          | `RequestPause`                 |
//! | `toggle`         | `TogglePlayPause`              |
//! | `tick 12.3`      | `Tick(12.3)`                   |
//! | `duration 225`   | `DurationResolved(225.0)`      |
//! | `seek 30`        | `Seek(30.0)`                   |
//! | `skip -5`        | `Skip(-5.0)`                   |
//! | `back`/`forward` | `SkipBack` / `SkipForward`     |
//! | `jump 3`         | `JumpToSegment(3)`             |
//! | `volume 0.4`     | `SetVolume(0.4)`               |
//! | `mute`           | `ToggleMute`                   |
//! | `ended`          | `MediaEnded`                   |
//! | `unload`         | `Unload`                       |

use std::str::FromStr;

use crate::lesson::Lesson;
use crate::segments::SegmentId;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the current lesson (or load the first one).
    Load(Box<Lesson>),
    /// Drop the current lesson and go back to idle.
    Unload,
    /// A position sample from the media clock.
    Tick(f64),
    /// The media collaborator learned the real duration.
    DurationResolved(f64),
    Seek(f64),
    Skip(f64),
    /// Skip backwards by the configured step.
    SkipBack,
    /// Skip forwards by the configured step.
    SkipForward,
    JumpToSegment(SegmentId),
    SetVolume(f64),
    ToggleMute,
    TogglePlayPause,
    RequestPlay,
    RequestPause,
    MediaEnded,
}

impl Command {
    /// Whether the command relocates the playback position, so the media clock must follow.
    pub fn moves_position(&self) -> bool {
        matches!(
            self,
            Self::Seek(_)
                | Self::Skip(_)
                | Self::SkipBack
                | Self::SkipForward
                | Self::JumpToSegment(_)
        )
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let keyword = parts
            .next()
            .ok_or_else(|| Error::msg("empty command"))?
            .to_ascii_lowercase();
        let arg = parts.next();
        if let Some(extra) = parts.next() {
            return Err(Error::msg(format!(
                "unexpected argument '{extra}' after '{keyword}'"
            )));
        }

        let command = match keyword.as_str() {
            "play" => Self::RequestPlay,
            "pause" => Self::RequestPause,
            "toggle" => Self::TogglePlayPause,
            "tick" => Self::Tick(number(&keyword, arg)?),
            "duration" => Self::DurationResolved(number(&keyword, arg)?),
            "seek" => Self::Seek(number(&keyword, arg)?),
            "skip" => Self::Skip(number(&keyword, arg)?),
            "back" => Self::SkipBack,
            "forward" => Self::SkipForward,
            "jump" => {
                let raw = required(&keyword, arg)?;
                let id = raw
                    .parse::<SegmentId>()
                    .map_err(|_| Error::msg(format!("'{keyword}' expects a segment id, got '{raw}'")))?;
                Self::JumpToSegment(id)
            }
            "volume" => Self::SetVolume(number(&keyword, arg)?),
            "mute" => Self::ToggleMute,
            "ended" => Self::MediaEnded,
            "unload" => Self::Unload,
            other => return Err(Error::msg(format!("unknown command '{other}'"))),
        };

        let takes_arg = matches!(
            command,
            Self::Tick(_)
                | Self::DurationResolved(_)
                | Self::Seek(_)
                | Self::Skip(_)
                | Self::JumpToSegment(_)
                | Self::SetVolume(_)
        );
        if !takes_arg && arg.is_some() {
            return Err(Error::msg(format!("'{keyword}' takes no argument")));
        }

        Ok(command)
    }
}

/// Parse a command script: one command per line, blank lines and `#` comments skipped.
///
/// Errors name the 1-based line number.
pub fn parse_script(script: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (idx, line) in script.lines().enumerate() {
        let line = match line.split_once('#') {
            Some((before, _)) => before,
            None => line,
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = line
            .parse::<Command>()
            .map_err(|err| Error::msg(format!("line {}: {err}", idx + 1)))?;
        commands.push(command);
    }
    Ok(commands)
}

fn required<'a>(keyword: &str, arg: Option<&'a str>) -> Result<&'a str> {
    arg.ok_or_else(|| Error::msg(format!("'{keyword}' expects an argument")))
}

fn number(keyword: &str, arg: Option<&str>) -> Result<f64> {
    let raw = required(keyword, arg)?;
    raw.parse::<f64>()
        .map_err(|_| Error::msg(format!("'{keyword}' expects a number, got '{raw}'")))
}
