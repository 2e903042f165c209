use std::error::Error as StdError;

use thiserror::Error;

/// Lilt's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Lilt's crate-wide error type.
///
/// Only the edges of the crate are fallible: reading lesson files, decoding JSON, parsing
/// command text, and writing encoded state. The playback engine itself never returns an error;
/// it clamps or ignores bad input instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
