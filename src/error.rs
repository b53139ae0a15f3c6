use std::error::Error as StdError;

use thiserror::Error;

/// Wordline's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Wordline's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
///
/// Two upstream failure classes are deliberately *not* represented here:
/// - malformed annotation records are skipped and counted in `merge::MergeReport`
/// - re-entrant playback updates are dropped as `playback::SeekOutcome::Dropped`
///
/// Neither is an error from the caller's point of view.
#[derive(Debug, Error)]
pub enum Error {
    /// The transcript payload matched none of the recognized upstream shapes.
    ///
    /// Callers running the full pipeline degrade this to an empty transcript; it is
    /// surfaced as an error only from the pure normalization entry points.
    #[error("unrecognized transcript format: {0}")]
    Format(String),

    /// The requested lexical-set or phoneme name is not in the phoneme table.
    #[error("unknown lexical set or phoneme: {0}")]
    UnknownPhoneme(String),

    /// The stress filter resolved to an empty set.
    ///
    /// We refuse to widen an empty filter to "any stress"; the caller gets this back
    /// and can correct the request.
    #[error("invalid stress filter: {0:?}")]
    InvalidStress(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
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
