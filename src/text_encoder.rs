use std::io::Write;

use crate::Result;
use crate::clock_format::format_clock;
use crate::state_encoder::{StateEncoder, StateFrame};

/// A `StateEncoder` that writes a human-readable status line per state.
///
/// ```text
/// playing  0:06 / 0:52  vol 70%  [2] Ghana ná heyeli yɛ March 6, 1957.
/// paused   0:00 / 3:45  muted    -
/// ```
///
/// Consecutive identical lines are written once, so a paused player polled at 10 Hz does not
/// flood the terminal.
pub struct TextEncoder<W: Write> {
    /// The underlying writer we stream text into.
    w: W,

    /// The last line written, used to drop repeats.
    last_line: Option<String>,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> TextEncoder<W> {
    /// Create a new text encoder that writes to the provided writer.
    pub fn new(w: W) -> Self {
        Self {
            w,
            last_line: None,
            closed: false,
        }
    }
}

impl<W: Write> StateEncoder for TextEncoder<W> {
    fn write_state(&mut self, frame: &StateFrame<'_>) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write state: encoder is already closed",
            ));
        }

        let line = format_line(frame);
        if self.last_line.as_deref() == Some(line.as_str()) {
            return Ok(());
        }

        writeln!(&mut self.w, "{line}")?;
        self.w.flush()?;
        self.last_line = Some(line);

        Ok(())
    }

    /// Flush the underlying writer. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

fn format_line(frame: &StateFrame<'_>) -> String {
    let state = frame.state;
    let volume = if state.is_muted {
        "muted".to_owned()
    } else {
        format!("vol {:.0}%", state.volume * 100.0)
    };
    let segment = match (state.active_segment_id, frame.active_text) {
        (Some(id), Some(text)) => format!("[{id}] {text}"),
        (Some(id), None) => format!("[{id}]"),
        (None, _) => "-".to_owned(),
    };

    format!(
        "{:<8} {} / {}  {:<8} {}",
        frame.status.to_string(),
        format_clock(state.position_seconds),
        format_clock(state.duration_seconds),
        volume,
        segment
    )
}
