//! Speech-to-text (STT) processing

use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

/// Upper bound on a single transcription request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response from OpenAI Whisper transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Response from Deepgram transcription API
#[derive(serde::Deserialize)]
struct DeepgramResponse {
    results: DeepgramResults,
}

#[derive(serde::Deserialize)]
struct DeepgramResults {
    channels: Vec<DeepgramChannel>,
}

#[derive(serde::Deserialize)]
struct DeepgramChannel {
    alternatives: Vec<DeepgramAlternative>,
}

#[derive(serde::Deserialize)]
struct DeepgramAlternative {
    transcript: String,
}

/// STT provider backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SttProvider {
    Whisper,
    Deepgram,
}

impl SttProvider {
    /// Model used when none is configured
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Whisper => "whisper-1",
            Self::Deepgram => "nova-2",
        }
    }
}

impl FromStr for SttProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "whisper" | "openai" => Ok(Self::Whisper),
            "deepgram" => Ok(Self::Deepgram),
            other => Err(Error::Config(format!("unknown STT provider: {other}"))),
        }
    }
}

/// Transcribes speech to text
pub struct SpeechToText {
    client: reqwest::Client,
    api_key: String,
    model: String,
    provider: SttProvider,
}

impl SpeechToText {
    /// Create a new STT instance for the given provider
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(provider: SttProvider, api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            let msg = match provider {
                SttProvider::Whisper => "OpenAI API key required for Whisper",
                SttProvider::Deepgram => "Deepgram API key required",
            };
            return Err(Error::Config(msg.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::RecognitionUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model,
            provider,
        })
    }

    /// Transcribe audio to text
    ///
    /// Returns `None` when the service answered but produced no usable
    /// transcript (rejected audio, empty result).
    ///
    /// # Arguments
    ///
    /// * `audio` - WAV audio bytes
    /// * `language` - BCP 47 language tag (e.g. `en-US`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecognitionUnavailable`] if the service cannot be reached
    pub async fn transcribe(&self, audio: &[u8], language: &str) -> Result<Option<String>> {
        let transcript = match self.provider {
            SttProvider::Whisper => self.transcribe_whisper(audio, language).await?,
            SttProvider::Deepgram => self.transcribe_deepgram(audio, language).await?,
        };

        Ok(clean_transcript(transcript))
    }

    /// Transcribe using OpenAI Whisper
    async fn transcribe_whisper(&self, audio: &[u8], language: &str) -> Result<Option<String>> {
        tracing::debug!(audio_bytes = audio.len(), language, "starting Whisper transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::RecognitionUnavailable(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("language", primary_language(language).to_string());

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Whisper request failed");
                Error::RecognitionUnavailable(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Whisper API error");
            return Ok(None);
        }

        let result: WhisperResponse = match response.json().await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse response");
                return Ok(None);
            }
        };

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(Some(result.text))
    }

    /// Transcribe using Deepgram
    async fn transcribe_deepgram(&self, audio: &[u8], language: &str) -> Result<Option<String>> {
        tracing::debug!(audio_bytes = audio.len(), language, "starting Deepgram transcription");

        let url = format!(
            "https://api.deepgram.com/v1/listen?model={}&language={}&punctuate=true",
            self.model, language
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", "audio/wav")
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Deepgram request failed");
                Error::RecognitionUnavailable(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Deepgram API error");
            return Ok(None);
        }

        let result: DeepgramResponse = match response.json().await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse Deepgram response");
                return Ok(None);
            }
        };

        let transcript = result
            .results
            .channels
            .first()
            .and_then(|c| c.alternatives.first())
            .map(|a| a.transcript.clone());

        tracing::info!(transcript = ?transcript, "transcription complete");
        Ok(transcript)
    }
}

/// Trim a transcript, treating blank text as nothing heard
fn clean_transcript(raw: Option<String>) -> Option<String> {
    raw.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Primary language subtag of a BCP 47 tag (`en-US` → `en`)
///
/// Whisper only accepts ISO-639-1 codes.
#[must_use]
pub fn primary_language(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_language() {
        assert_eq!(primary_language("en-US"), "en");
        assert_eq!(primary_language("pt_BR"), "pt");
        assert_eq!(primary_language("de"), "de");
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("Whisper".parse::<SttProvider>().unwrap(), SttProvider::Whisper);
        assert_eq!(" deepgram ".parse::<SttProvider>().unwrap(), SttProvider::Deepgram);
        assert!("vosk".parse::<SttProvider>().is_err());
    }

    #[test]
    fn test_blank_transcript_is_nothing_heard() {
        assert_eq!(clean_transcript(None), None);
        assert_eq!(clean_transcript(Some(String::new())), None);
        assert_eq!(clean_transcript(Some(" \n\t ".to_string())), None);
        assert_eq!(
            clean_transcript(Some("  hello there \n".to_string())),
            Some("hello there".to_string())
        );
    }

    #[test]
    fn test_missing_key_rejected() {
        let err = SpeechToText::new(SttProvider::Whisper, String::new(), "whisper-1".to_string());
        assert!(matches!(err, Err(Error::Config(_))));
    }
}
