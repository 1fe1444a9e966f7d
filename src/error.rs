//! Error types for Parley

use thiserror::Error;

/// Result type alias for Parley operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Parley
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Transcription service could not be reached
    #[error("recognition unavailable: {0}")]
    RecognitionUnavailable(String),

    /// Input device could not be opened for ambient noise calibration
    #[error("ambient noise calibration failed: {0}")]
    AmbientNoiseCalibrationFailed(String),

    /// Speech renderer could not be initialized
    #[error("synthesis unavailable: {0}")]
    SynthesisUnavailable(String),

    /// Audio error
    #[error("audio error: {0}")]
    Audio(String),
}

impl Error {
    /// Whether this error ends the dialogue session rather than a single turn
    #[must_use]
    pub const fn is_fatal_to_session(&self) -> bool {
        !matches!(self, Self::SynthesisUnavailable(_))
    }
}
