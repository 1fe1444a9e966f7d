//! Session wiring
//!
//! Builds the gates from configuration and runs either the dialogue loop or
//! the one-shot recognition demo. Gates are created here at session start
//! and dropped when the session ends.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::dialogue::{
    DEFAULT_LANGUAGE, DialogueController, ResponseDirective, SessionOutcome, Utterance,
};
use crate::voice::{
    Capture, MicrophoneInput, SpeechInput, SpeechOutput, SpeechToText, SynthesizedOutput,
    TextToSpeech,
};
use crate::{Error, Result};

/// Wait for speech in the recognition demo
const DEMO_TIMEOUT: Duration = Duration::from_secs(10);

/// Phrase limit in the recognition demo
const DEMO_PHRASE_TIME_LIMIT: Duration = Duration::from_secs(20);

/// Build the microphone gate
///
/// # Errors
///
/// Returns error if the STT key is missing or no input device exists
pub fn build_input(config: &Config) -> Result<MicrophoneInput> {
    let api_key = config.stt_api_key().unwrap_or_default().to_string();
    let stt = SpeechToText::new(
        config.voice.stt_provider,
        api_key,
        config.voice.stt_model.clone(),
    )?;
    MicrophoneInput::new(stt)
}

/// Build the speaker gate, persisting to the configured artifact path
///
/// # Errors
///
/// Returns error if the TTS key is missing or no output device exists
pub fn build_output(config: &Config) -> Result<SynthesizedOutput> {
    build_speaker(config, config.voice.artifact_path.clone())
}

fn build_speaker(config: &Config, artifact_path: PathBuf) -> Result<SynthesizedOutput> {
    let api_key = config.api_keys.openai.clone().unwrap_or_default();
    let tts = TextToSpeech::new(
        api_key,
        config.voice.tts_voice.clone(),
        config.voice.tts_model.clone(),
    )
    .map_err(|e| Error::SynthesisUnavailable(e.to_string()))?;
    SynthesizedOutput::new(tts, artifact_path)
}

/// Run the dialogue loop with gates built from `config`
///
/// # Errors
///
/// Returns error if a gate cannot be built or the session fails
#[allow(clippy::future_not_send)]
pub async fn run_dialogue(config: &Config) -> Result<SessionOutcome> {
    let input = build_input(config)?;
    let output = build_output(config)?;

    let mut controller = DialogueController::new(
        input,
        output,
        config.capture.clone(),
        config.session.clone(),
    );
    controller.run().await
}

/// One-shot recognition demo: welcome prompt, one capture, echo
///
/// Returns the utterance if one was heard.
///
/// # Errors
///
/// Returns error if either gate fails
#[allow(clippy::future_not_send)]
pub async fn run_recognition_demo<I: SpeechInput, O: SpeechOutput>(
    input: &mut I,
    output: &mut O,
    persist: bool,
) -> Result<Option<Utterance>> {
    tracing::info!("welcome to the speech recognition demo");
    output
        .speak(
            &ResponseDirective::new(
                "Welcome to the speech recognition demo! Please speak into the microphone.",
                140,
                1.0,
            ),
            persist,
        )
        .await?;

    let capture = input
        .capture(DEFAULT_LANGUAGE, DEMO_TIMEOUT, DEMO_PHRASE_TIME_LIMIT)
        .await?;

    match capture {
        Capture::Heard(utterance) => {
            tracing::info!(text = utterance.text(), "recognized speech");
            output
                .speak(
                    &ResponseDirective::plain(format!("You said: {}", utterance.text())),
                    persist,
                )
                .await?;
            Ok(Some(utterance))
        }
        Capture::NoSpeech => {
            tracing::info!("no speech recognized");
            output
                .speak(
                    &ResponseDirective::plain("No speech recognized. Please try again."),
                    persist,
                )
                .await?;
            Ok(None)
        }
    }
}

/// Speak a single piece of text
///
/// With `persist`, the audio goes to the `say` artifact path rather than the
/// one the dialogue loop overwrites.
///
/// # Errors
///
/// Returns error if the output gate cannot be built or synthesis fails
#[allow(clippy::future_not_send)]
pub async fn say(config: &Config, text: &str, persist: bool) -> Result<()> {
    let mut output = build_speaker(config, config.voice.say_artifact_path.clone())?;
    output.speak(&ResponseDirective::plain(text), persist).await
}
