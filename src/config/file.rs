//! TOML configuration file loading
//!
//! Supports `~/.config/parley/config.toml` as a persistent config source.
//! All fields are optional. The file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ParleyConfigFile {
    /// Microphone capture configuration
    #[serde(default)]
    pub capture: CaptureFileConfig,

    /// Dialogue session configuration
    #[serde(default)]
    pub session: SessionFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Capture defaults applied to every listen call
#[derive(Debug, Default, Deserialize)]
pub struct CaptureFileConfig {
    /// Language tag for recognition (e.g. "en-US")
    pub language: Option<String>,

    /// Seconds to wait for speech to start
    pub timeout_secs: Option<u64>,

    /// Maximum seconds of a single phrase
    pub phrase_time_limit_secs: Option<u64>,
}

/// Session loop configuration
#[derive(Debug, Default, Deserialize)]
pub struct SessionFileConfig {
    /// Stop after this many consecutive turns without speech
    pub max_consecutive_retries: Option<u32>,

    /// Minimum milliseconds between consecutive retries
    pub retry_interval_ms: Option<u64>,

    /// Save responses to a file and open them instead of playing directly
    pub persist: Option<bool>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: Option<String>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// Where persisted responses are written
    pub artifact_path: Option<String>,

    /// Where `say --save` writes its audio
    pub say_artifact_path: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub deepgram: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ParleyConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ParleyConfigFile {
    config_file_path().map_or_else(ParleyConfigFile::default, |path| load_config_file_from(&path))
}

/// Load a TOML config file from an explicit path
///
/// Returns `ParleyConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file_from(path: &Path) -> ParleyConfigFile {
    if !path.exists() {
        return ParleyConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ParleyConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ParleyConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/parley/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("parley").join("config.toml"))
}
