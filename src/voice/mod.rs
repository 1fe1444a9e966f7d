//! Voice processing module
//!
//! Handles audio capture, phrase detection, STT, TTS, and playback, and
//! exposes them to the dialogue loop through the [`SpeechInput`] and
//! [`SpeechOutput`] gates.

mod capture;
mod detector;
mod gate;
mod microphone;
mod playback;
mod player;
mod speaker;
mod stt;
mod tts;

pub use capture::{AudioCapture, SAMPLE_RATE, calculate_rms, samples_to_wav};
pub use detector::{
    ListenStep, MIN_ENERGY_THRESHOLD, PhraseDetector, PhraseListener, PhraseState, RECORDING_GRACE,
    calibrated_threshold, duration_to_samples,
};
pub use gate::{Capture, SpeechInput, SpeechOutput};
pub use microphone::MicrophoneInput;
pub use playback::{AudioPlayback, PLAYBACK_SAMPLE_RATE, apply_volume, decode_mp3};
pub use player::{open_with_default_player, opener_command};
pub use speaker::SynthesizedOutput;
pub use stt::{SpeechToText, SttProvider, primary_language};
pub use tts::{BASELINE_RATE, TextToSpeech, rate_to_speed};
