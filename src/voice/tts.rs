//! Text-to-speech (TTS) processing

use std::time::Duration;

use crate::{Error, Result};

/// Speech rate (words per minute) that maps to a speed multiplier of 1.0
pub const BASELINE_RATE: f32 = 150.0;

/// Upper bound on a single synthesis request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Synthesizes speech from text using an OpenAI-compatible endpoint
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: String,
    voice: String,
    model: String,
}

impl TextToSpeech {
    /// Create a new TTS instance
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: String, voice: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::SynthesisUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            voice,
            model,
        })
    }

    /// Synthesize text to speech
    ///
    /// # Arguments
    ///
    /// * `text` - Text to synthesize
    /// * `rate` - Speech rate in words per minute
    ///
    /// # Returns
    ///
    /// Audio bytes (MP3 format)
    ///
    /// # Errors
    ///
    /// Returns [`Error::SynthesisUnavailable`] if synthesis fails
    pub async fn synthesize(&self, text: &str, rate: u32) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: rate_to_speed(rate),
        };

        tracing::debug!(text, rate, speed = request.speed, "synthesizing");

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::SynthesisUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::SynthesisUnavailable(format!(
                "OpenAI TTS error {status}: {body}"
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::SynthesisUnavailable(e.to_string()))?;
        Ok(audio.to_vec())
    }
}

/// Map a words-per-minute rate to the API speed multiplier (0.25 to 4.0)
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn rate_to_speed(rate: u32) -> f32 {
    (rate as f32 / BASELINE_RATE).clamp(0.25, 4.0)
}
