/// The supported output formats for encoded playback states.
///
/// With the `cli` feature, `ValueEnum` lets this enum be used directly as a `clap` flag.
/// Each variant maps to a concrete `StateEncoder` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// One JSON object per state, newline-delimited.
    Json,

    /// A human-readable status line per state.
    #[default]
    Text,
}
