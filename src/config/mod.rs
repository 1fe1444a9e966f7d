//! Configuration management for Parley
//!
//! Priority is env > `config.toml` > defaults. With no file and no env the
//! loop listens for 30s per phrase in `en-US`, retries forever, and plays
//! responses directly.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use crate::dialogue::DEFAULT_LANGUAGE;
use crate::voice::SttProvider;

/// Default seconds to wait for speech, and the default phrase limit
const DEFAULT_CAPTURE_SECS: u64 = 30;

/// Default pacing between consecutive no-speech retries
const DEFAULT_RETRY_INTERVAL_MS: u64 = 500;

/// Default filename for persisted responses
pub const DEFAULT_ARTIFACT_PATH: &str = "speech_output.mp3";

/// Default filename for `say --save`
pub const DEFAULT_SAY_ARTIFACT_PATH: &str = "response.mp3";

/// Parley configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Capture parameters passed to every listen call
    pub capture: CaptureConfig,

    /// Session loop behavior
    pub session: SessionConfig,

    /// Voice backend selection
    pub voice: VoiceConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// Parameters for a single capture call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Language tag for recognition
    pub language: String,

    /// How long to wait for speech to start
    pub timeout: Duration,

    /// Maximum length of one phrase
    pub phrase_time_limit: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(DEFAULT_CAPTURE_SECS),
            phrase_time_limit: Duration::from_secs(DEFAULT_CAPTURE_SECS),
        }
    }
}

/// Dialogue session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// End the session after this many consecutive no-speech turns.
    /// `None` keeps listening until the user quits.
    pub max_consecutive_retries: Option<u32>,

    /// Minimum time between consecutive retries; zero disables pacing
    pub retry_interval: Duration,

    /// Persist responses to a file and open them with the host player
    pub persist: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_consecutive_retries: None,
            retry_interval: Duration::from_millis(DEFAULT_RETRY_INTERVAL_MS),
            persist: false,
        }
    }
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT backend
    pub stt_provider: SttProvider,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: String,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// Where persisted responses are written
    pub artifact_path: PathBuf,

    /// Where one-off `say --save` audio is written
    pub say_artifact_path: PathBuf,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            stt_provider: SttProvider::Whisper,
            stt_model: SttProvider::Whisper.default_model().to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            say_artifact_path: PathBuf::from(DEFAULT_SAY_ARTIFACT_PATH),
        }
    }
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (for Whisper and TTS)
    pub openai: Option<String>,

    /// `Deepgram` API key (optional STT)
    pub deepgram: Option<String>,
}

impl Config {
    /// Load configuration from the environment and the config file
    #[must_use]
    pub fn load() -> Self {
        Self::resolve(file::load_config_file(), |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with an environment lookup
    #[must_use]
    pub fn resolve(fc: file::ParleyConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let capture = CaptureConfig {
            language: env("PARLEY_LANGUAGE")
                .or(fc.capture.language)
                .unwrap_or(defaults.capture.language),
            timeout: fc
                .capture
                .timeout_secs
                .map_or(defaults.capture.timeout, Duration::from_secs),
            phrase_time_limit: fc
                .capture
                .phrase_time_limit_secs
                .map_or(defaults.capture.phrase_time_limit, Duration::from_secs),
        };

        let session = SessionConfig {
            max_consecutive_retries: fc.session.max_consecutive_retries,
            retry_interval: fc
                .session
                .retry_interval_ms
                .map_or(defaults.session.retry_interval, Duration::from_millis),
            persist: fc.session.persist.unwrap_or(defaults.session.persist),
        };

        let stt_provider = env("PARLEY_STT_PROVIDER")
            .or(fc.voice.stt_provider)
            .and_then(|name| {
                let parsed = name.parse::<SttProvider>();
                if parsed.is_err() {
                    tracing::warn!(provider = %name, "unknown STT provider, using whisper");
                }
                parsed.ok()
            })
            .unwrap_or(defaults.voice.stt_provider);

        let voice = VoiceConfig {
            stt_provider,
            stt_model: env("PARLEY_STT_MODEL")
                .or(fc.voice.stt_model)
                .unwrap_or_else(|| stt_provider.default_model().to_string()),
            tts_model: env("PARLEY_TTS_MODEL")
                .or(fc.voice.tts_model)
                .unwrap_or(defaults.voice.tts_model),
            tts_voice: env("PARLEY_TTS_VOICE")
                .or(fc.voice.tts_voice)
                .unwrap_or(defaults.voice.tts_voice),
            artifact_path: fc
                .voice
                .artifact_path
                .map_or(defaults.voice.artifact_path, PathBuf::from),
            say_artifact_path: fc
                .voice
                .say_artifact_path
                .map_or(defaults.voice.say_artifact_path, PathBuf::from),
        };

        let api_keys = ApiKeys {
            openai: env("OPENAI_API_KEY").or(fc.api_keys.openai),
            deepgram: env("DEEPGRAM_API_KEY").or(fc.api_keys.deepgram),
        };

        Self {
            capture,
            session,
            voice,
            api_keys,
        }
    }

    /// API key for the configured STT provider
    #[must_use]
    pub fn stt_api_key(&self) -> Option<&str> {
        match self.voice.stt_provider {
            SttProvider::Whisper => self.api_keys.openai.as_deref(),
            SttProvider::Deepgram => self.api_keys.deepgram.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_match_original_loop() {
        let config = Config::resolve(file::ParleyConfigFile::default(), no_env);

        assert_eq!(config.capture.language, "en-US");
        assert_eq!(config.capture.timeout, Duration::from_secs(30));
        assert_eq!(config.capture.phrase_time_limit, Duration::from_secs(30));
        assert_eq!(config.session.max_consecutive_retries, None);
        assert!(!config.session.persist);
        assert_eq!(config.voice.artifact_path, PathBuf::from("speech_output.mp3"));
        assert_eq!(config.voice.say_artifact_path, PathBuf::from("response.mp3"));
    }

    #[test]
    fn test_artifact_paths_from_file() {
        let fc: file::ParleyConfigFile = toml::from_str(
            r#"
            [voice]
            say_artifact_path = "/tmp/line.mp3"
            "#,
        )
        .unwrap();

        let config = Config::resolve(fc, no_env);
        assert_eq!(config.voice.say_artifact_path, PathBuf::from("/tmp/line.mp3"));
        assert_eq!(config.voice.artifact_path, PathBuf::from("speech_output.mp3"));
    }

    #[test]
    fn test_env_overrides_file() {
        let fc: file::ParleyConfigFile = toml::from_str(
            r#"
            [voice]
            stt_provider = "whisper"
            tts_voice = "nova"

            [api_keys]
            openai = "from-file"
            "#,
        )
        .unwrap();

        let config = Config::resolve(fc, |key| match key {
            "PARLEY_STT_PROVIDER" => Some("deepgram".to_string()),
            "DEEPGRAM_API_KEY" => Some("dg-key".to_string()),
            _ => None,
        });

        assert_eq!(config.voice.stt_provider, SttProvider::Deepgram);
        assert_eq!(config.voice.stt_model, "nova-2");
        assert_eq!(config.voice.tts_voice, "nova");
        assert_eq!(config.api_keys.openai.as_deref(), Some("from-file"));
        assert_eq!(config.stt_api_key(), Some("dg-key"));
    }

    #[test]
    fn test_unknown_provider_falls_back() {
        let config = Config::resolve(file::ParleyConfigFile::default(), |key| {
            (key == "PARLEY_STT_PROVIDER").then(|| "carrier-pigeon".to_string())
        });
        assert_eq!(config.voice.stt_provider, SttProvider::Whisper);
    }
}
