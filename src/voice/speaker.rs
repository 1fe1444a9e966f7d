//! Speech output gate: synthesize, then play or save and open

use std::path::PathBuf;

use async_trait::async_trait;

use super::gate::SpeechOutput;
use super::playback::AudioPlayback;
use super::player::open_with_default_player;
use super::tts::TextToSpeech;
use crate::dialogue::ResponseDirective;
use crate::{Error, Result};

/// Speech output backed by a TTS service and the default speakers
pub struct SynthesizedOutput {
    tts: TextToSpeech,
    artifact_path: PathBuf,
}

impl SynthesizedOutput {
    /// Create the gate, checking that an output device is present
    ///
    /// # Errors
    ///
    /// Returns [`Error::SynthesisUnavailable`] if no usable output device exists
    pub fn new(tts: TextToSpeech, artifact_path: PathBuf) -> Result<Self> {
        // Open and release; the device is reopened for every utterance
        drop(AudioPlayback::new().map_err(synthesis_failed)?);
        Ok(Self { tts, artifact_path })
    }

    /// Play synthesized audio directly, blocking until it finishes
    fn play(audio: &[u8], volume: f32) -> Result<()> {
        let playback = AudioPlayback::new().map_err(synthesis_failed)?;
        playback.play_mp3(audio, volume).map_err(synthesis_failed)
    }

    /// Save synthesized audio and open it with the host player
    fn persist(&self, audio: &[u8]) -> Result<()> {
        std::fs::write(&self.artifact_path, audio).map_err(|e| {
            Error::SynthesisUnavailable(format!(
                "failed to write {}: {e}",
                self.artifact_path.display()
            ))
        })?;
        tracing::info!(path = %self.artifact_path.display(), "audio saved");

        open_with_default_player(&self.artifact_path)
    }
}

#[async_trait(?Send)]
impl SpeechOutput for SynthesizedOutput {
    async fn speak(&mut self, directive: &ResponseDirective, persist: bool) -> Result<()> {
        tracing::debug!(
            text = %directive.text,
            rate = directive.rate,
            volume = directive.volume,
            persist,
            "speaking"
        );

        let audio = self.tts.synthesize(&directive.text, directive.rate).await?;

        if persist {
            self.persist(&audio)
        } else {
            Self::play(&audio, directive.volume)
        }
    }
}

fn synthesis_failed(e: Error) -> Error {
    match e {
        Error::SynthesisUnavailable(_) => e,
        other => Error::SynthesisUnavailable(other.to_string()),
    }
}
