//! Microphone input gate: calibrate, record one phrase, transcribe

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
use super::detector::{ListenStep, PhraseListener, calibrated_threshold};
use super::gate::{Capture, SpeechInput};
use super::stt::SpeechToText;
use crate::dialogue::Utterance;
use crate::{Error, Result};

/// How long to sample ambient noise before listening
const CALIBRATION_DURATION: Duration = Duration::from_secs(1);

/// Interval between reads of the capture buffer
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Speech input backed by the default microphone and an STT service
pub struct MicrophoneInput {
    stt: SpeechToText,
}

impl MicrophoneInput {
    /// Create the gate, checking that an input device is present
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbientNoiseCalibrationFailed`] if no usable input
    /// device exists
    pub fn new(stt: SpeechToText) -> Result<Self> {
        // Open and release; the device is reopened for every capture
        drop(AudioCapture::new().map_err(calibration_failed)?);
        Ok(Self { stt })
    }

    /// Record one phrase, releasing the microphone before returning
    #[allow(clippy::future_not_send)]
    async fn record_phrase(timeout: Duration, phrase_time_limit: Duration) -> Result<Option<Vec<f32>>> {
        let mut capture = AudioCapture::new().map_err(calibration_failed)?;
        capture.start().map_err(calibration_failed)?;

        tokio::time::sleep(CALIBRATION_DURATION).await;
        let ambient = capture.take_buffer();
        if ambient.is_empty() {
            return Err(Error::AmbientNoiseCalibrationFailed(
                "no audio received from input device".to_string(),
            ));
        }

        let threshold = calibrated_threshold(&ambient);
        tracing::info!(
            threshold,
            timeout_secs = timeout.as_secs(),
            phrase_time_limit_secs = phrase_time_limit.as_secs(),
            "listening for speech"
        );

        let mut listener = PhraseListener::new(threshold, timeout, phrase_time_limit);
        let started = Instant::now();

        loop {
            tokio::time::sleep(POLL_INTERVAL).await;

            match listener.poll(&capture.take_buffer(), started.elapsed()) {
                ListenStep::Continue => {}
                ListenStep::Phrase(samples) => return Ok(Some(samples)),
                ListenStep::TimedOut => {
                    tracing::info!("listening timed out, no speech detected");
                    return Ok(None);
                }
            }
        }
    }
}

#[async_trait(?Send)]
impl SpeechInput for MicrophoneInput {
    async fn capture(
        &mut self,
        language: &str,
        timeout: Duration,
        phrase_time_limit: Duration,
    ) -> Result<Capture> {
        let Some(samples) = Self::record_phrase(timeout, phrase_time_limit).await? else {
            return Ok(Capture::NoSpeech);
        };

        tracing::debug!(samples = samples.len(), "phrase recorded");
        let wav = samples_to_wav(&samples, SAMPLE_RATE)?;

        match self.stt.transcribe(&wav, language).await? {
            Some(text) => Ok(Capture::Heard(Utterance::new(text, language))),
            None => {
                tracing::info!("could not understand the audio");
                Ok(Capture::NoSpeech)
            }
        }
    }
}

#[allow(clippy::needless_pass_by_value)]
fn calibration_failed(e: Error) -> Error {
    Error::AmbientNoiseCalibrationFailed(e.to_string())
}
