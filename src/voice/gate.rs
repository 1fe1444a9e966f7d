//! Gate contracts between the dialogue loop and the audio engines

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;
use crate::dialogue::{ResponseDirective, Utterance};

/// Result of one capture call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// Speech was recognized
    Heard(Utterance),
    /// Nothing intelligible within the time budget; the caller should retry
    NoSpeech,
}

/// Produces one transcript per call
///
/// Futures are not `Send`: audio streams are tied to the thread that opened them.
#[async_trait(?Send)]
pub trait SpeechInput {
    /// Listen once
    ///
    /// # Arguments
    ///
    /// * `language` - Language tag for recognition
    /// * `timeout` - How long to wait for speech to start
    /// * `phrase_time_limit` - Longest phrase to record
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AmbientNoiseCalibrationFailed`] if the input
    /// device cannot be opened, or [`crate::Error::RecognitionUnavailable`]
    /// if the transcription service cannot be reached
    async fn capture(
        &mut self,
        language: &str,
        timeout: Duration,
        phrase_time_limit: Duration,
    ) -> Result<Capture>;
}

/// Renders a directive as speech
#[async_trait(?Send)]
pub trait SpeechOutput {
    /// Speak a directive, either directly or by saving and opening an audio file
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SynthesisUnavailable`] if the renderer cannot be used
    async fn speak(&mut self, directive: &ResponseDirective, persist: bool) -> Result<()>;
}
