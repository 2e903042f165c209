use std::io::Write;

use crate::Result;
use crate::state_encoder::{StateEncoder, StateFrame};

/// A `StateEncoder` that writes one JSON object per line (NDJSON).
///
/// Output streams straight to the writer and every line is a complete JSON document, so a
/// consumer can follow playback live (`lilt-cli ... | jq`).
///
/// Example output:
/// ```json
/// {"status":"playing","isPlaying":true,"positionSeconds":5.6,"durationSeconds":52.0,"volume":0.7,"isMuted":false,"activeSegmentId":2,"activeText":"..."}
/// ```
pub struct JsonLinesEncoder<W: Write> {
    /// The underlying writer we stream JSON into.
    w: W,

    /// Whether the encoder has been closed.
    /// Once closed, no further writes are allowed.
    closed: bool,
}

impl<W: Write> JsonLinesEncoder<W> {
    /// Create a new JSON lines encoder that writes to the given writer.
    pub fn new(w: W) -> Self {
        Self { w, closed: false }
    }
}

impl<W: Write> StateEncoder for JsonLinesEncoder<W> {
    /// Serialize a single frame as one line.
    fn write_state(&mut self, frame: &StateFrame<'_>) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write state: encoder is already closed",
            ));
        }

        serde_json::to_writer(&mut self.w, frame)?;
        self.w.write_all(b"\n")?;

        self.w.flush()?;

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
