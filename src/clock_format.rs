//! `M:SS` clock strings, as shown next to the progress bar and in lesson listings.

/// Format seconds as `M:SS`.
///
/// Minutes are `floor(seconds / 60)` and are not padded; seconds are `floor(seconds % 60)`
/// padded to two digits. Negative and non-finite input renders as `0:00`.
pub fn format_clock(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };

    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{minutes}:{secs:02}")
}

/// Parse a declared `M:SS` duration into seconds.
///
/// Both parts may be fractional (`"0:07.5"`). Returns `None` for anything that does not
/// yield a finite, non-negative number of seconds.
pub fn parse_clock(raw: &str) -> Option<f64> {
    let (minutes, seconds) = raw.trim().split_once(':')?;
    let minutes: f64 = minutes.trim().parse().ok()?;
    let seconds: f64 = seconds.trim().parse().ok()?;

    let total = minutes * 60.0 + seconds;
    if total.is_finite() && total >= 0.0 && minutes >= 0.0 && seconds >= 0.0 {
        Some(total)
    } else {
        None
    }
}
