//! `lilt`: audio lesson playback with a synchronized transcript.
//!
//! This crate provides:
//! - Lesson and transcript types, loadable from JSON
//! - A playback engine that tracks position, the highlighted transcript line, and volume/mute
//! - A tick-driven session that keeps the engine in step with a media clock (`session` feature)
//! - Pluggable encoders for emitting playback state (JSON lines, plain text)
//!
//! The engine is a plain state machine with no I/O, so UI bindings, the CLI, and tests all
//! drive it the same way: through [`Command`]s or its methods.

pub mod error;

// Lesson data.
pub mod lesson;
pub mod segments;

// Playback core.
pub mod command;
pub mod opts;
pub mod playback;

// Media clock interface and the session that polls it.
pub mod media;
#[cfg(feature = "session")]
pub mod session;

// Presentation helpers and state encoders.
pub mod clock_format;
pub mod json_lines_encoder;
pub mod output_type;
pub mod state_encoder;
pub mod text_encoder;

// Logging configuration.
#[cfg(feature = "logging")]
pub mod logging;

pub use command::Command;
pub use error::{Error, Result};
pub use lesson::Lesson;
pub use opts::PlayerOpts;
pub use output_type::OutputType;
pub use playback::{PlaybackEngine, PlaybackState, Status};
pub use segments::{SegmentId, TranscriptSegment};
#[cfg(feature = "session")]
pub use session::Session;

#[cfg(feature = "logging")]
pub use logging::init as init_logging;
