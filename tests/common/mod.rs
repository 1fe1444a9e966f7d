//! Shared test utilities: scripted gates that stand in for audio hardware

#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;

use parley::config::{CaptureConfig, SessionConfig};
use parley::voice::{Capture, SpeechInput, SpeechOutput};
use parley::{Error, ResponseDirective, Result, Utterance};

/// One recorded capture call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureCall {
    pub language: String,
    pub timeout: Duration,
    pub phrase_time_limit: Duration,
}

/// Input gate that replays a fixed script of captures
///
/// Once the script runs out every call fails with `RecognitionUnavailable`,
/// so a loop that never terminates still ends the test.
#[derive(Default)]
pub struct ScriptedInput {
    script: VecDeque<Result<Capture>>,
    pub calls: Vec<CaptureCall>,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = Result<Capture>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            calls: Vec::new(),
        }
    }

    /// Script made of transcripts (`Some`) and silent turns (`None`)
    pub fn said(turns: &[Option<&str>]) -> Self {
        Self::new(turns.iter().map(|t| {
            Ok(t.map_or(Capture::NoSpeech, |text| {
                Capture::Heard(Utterance::new(text, "en-US"))
            }))
        }))
    }
}

#[async_trait(?Send)]
impl SpeechInput for ScriptedInput {
    async fn capture(
        &mut self,
        language: &str,
        timeout: Duration,
        phrase_time_limit: Duration,
    ) -> Result<Capture> {
        self.calls.push(CaptureCall {
            language: language.to_string(),
            timeout,
            phrase_time_limit,
        });

        self.script
            .pop_front()
            .unwrap_or_else(|| Err(Error::RecognitionUnavailable("script exhausted".to_string())))
    }
}

/// Output gate that records every directive it is asked to speak
#[derive(Default)]
pub struct RecordingOutput {
    pub spoken: Vec<(ResponseDirective, bool)>,
    /// Fail with `SynthesisUnavailable` on these call indexes
    pub fail_on: Vec<usize>,
    calls: usize,
}

impl RecordingOutput {
    pub fn failing_on(fail_on: Vec<usize>) -> Self {
        Self {
            fail_on,
            ..Self::default()
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.spoken.iter().map(|(d, _)| d.text.as_str()).collect()
    }
}

#[async_trait(?Send)]
impl SpeechOutput for RecordingOutput {
    async fn speak(&mut self, directive: &ResponseDirective, persist: bool) -> Result<()> {
        let call = self.calls;
        self.calls += 1;

        if self.fail_on.contains(&call) {
            return Err(Error::SynthesisUnavailable("renderer offline".to_string()));
        }

        self.spoken.push((directive.clone(), persist));
        Ok(())
    }
}

/// Session settings with retry pacing disabled
pub fn unpaced_session() -> SessionConfig {
    SessionConfig {
        retry_interval: Duration::ZERO,
        ..SessionConfig::default()
    }
}

pub fn default_capture() -> CaptureConfig {
    CaptureConfig::default()
}
