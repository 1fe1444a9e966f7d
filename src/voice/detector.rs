//! Phrase detection
//!
//! Energy-based endpointing for a single capture: wait for the level to rise
//! above a threshold calibrated against ambient noise, record, and stop on a
//! pause or when the phrase limit is reached.

use std::time::Duration;

use super::capture::{SAMPLE_RATE, calculate_rms};

/// Lowest threshold a calibration may produce
pub const MIN_ENERGY_THRESHOLD: f32 = 0.01;

/// Ambient energy is multiplied by this to get the speech threshold
const DYNAMIC_ENERGY_RATIO: f32 = 1.5;

/// Minimum duration of speech to count as a phrase (0.3s at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800;

/// Silence after speech that ends a phrase (0.8s at 16kHz)
const PAUSE_SAMPLES: usize = 12800;

/// Slack on top of the phrase limit before a recording is cut off by the clock
pub const RECORDING_GRACE: Duration = Duration::from_secs(1);

/// Speech threshold for the given ambient noise window
#[must_use]
pub fn calibrated_threshold(ambient: &[f32]) -> f32 {
    (calculate_rms(ambient) * DYNAMIC_ENERGY_RATIO).max(MIN_ENERGY_THRESHOLD)
}

/// Convert a duration to a sample count at [`SAMPLE_RATE`]
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub const fn duration_to_samples(duration: Duration) -> usize {
    (duration.as_millis() * SAMPLE_RATE as u128 / 1000) as usize
}

/// State of the phrase detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseState {
    /// No speech yet
    Waiting,
    /// Speech started, recording
    Recording,
    /// Phrase ended by a pause or the phrase limit
    Complete,
}

/// Finds one phrase in a stream of audio chunks
pub struct PhraseDetector {
    threshold: f32,
    phrase_limit: usize,
    state: PhraseState,
    phrase: Vec<f32>,
    silence_counter: usize,
}

impl PhraseDetector {
    /// Create a detector
    ///
    /// # Arguments
    ///
    /// * `threshold` - RMS level that counts as speech
    /// * `phrase_time_limit` - Longest phrase to record
    #[must_use]
    pub fn new(threshold: f32, phrase_time_limit: Duration) -> Self {
        Self {
            threshold,
            phrase_limit: duration_to_samples(phrase_time_limit).max(1),
            state: PhraseState::Waiting,
            phrase: Vec::new(),
            silence_counter: 0,
        }
    }

    /// Feed a chunk of samples and return the resulting state
    pub fn process(&mut self, samples: &[f32]) -> PhraseState {
        if samples.is_empty() {
            return self.state;
        }

        let energy = calculate_rms(samples);
        let is_speech = energy > self.threshold;

        match self.state {
            PhraseState::Waiting => {
                if !is_speech {
                    return self.state;
                }
                self.state = PhraseState::Recording;
                self.phrase.clear();
                self.phrase.extend_from_slice(samples);
                self.silence_counter = 0;
                tracing::trace!(energy, threshold = self.threshold, "speech detected");
            }
            PhraseState::Recording => {
                self.phrase.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                tracing::trace!(
                    buffer_len = self.phrase.len(),
                    silence = self.silence_counter,
                    is_speech,
                    energy,
                    "recording"
                );
            }
            PhraseState::Complete => return self.state,
        }

        if self.phrase.len() >= self.phrase_limit {
            self.phrase.truncate(self.phrase_limit);
            self.state = PhraseState::Complete;
            tracing::debug!(samples = self.phrase.len(), "phrase limit reached");
        } else if self.silence_counter > PAUSE_SAMPLES {
            if self.phrase.len() - self.silence_counter > MIN_SPEECH_SAMPLES {
                self.state = PhraseState::Complete;
                tracing::debug!(samples = self.phrase.len(), "phrase complete");
            } else {
                // A click or bump, not a phrase
                tracing::trace!("speech too short - resetting");
                self.reset();
            }
        }

        self.state
    }

    /// Take the recorded phrase, resetting the detector
    pub fn take_phrase(&mut self) -> Vec<f32> {
        let phrase = std::mem::take(&mut self.phrase);
        self.reset();
        phrase
    }

    /// Get the recorded samples so far
    #[must_use]
    pub fn phrase(&self) -> &[f32] {
        &self.phrase
    }

    /// Reset detector to waiting state
    pub fn reset(&mut self) {
        self.state = PhraseState::Waiting;
        self.phrase.clear();
        self.silence_counter = 0;
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> PhraseState {
        self.state
    }

}

/// Outcome of one poll of a [`PhraseListener`]
#[derive(Debug, Clone, PartialEq)]
pub enum ListenStep {
    /// Keep polling
    Continue,
    /// A phrase was recorded
    Phrase(Vec<f32>),
    /// Nobody started speaking before the timeout
    TimedOut,
}

/// Wall-clock bounds around a [`PhraseDetector`]
///
/// The detector counts samples, so a stream that stops delivering audio
/// would never end a phrase. The listener gives up waiting after `timeout`
/// and cuts a recording off once it has run for the phrase limit plus
/// [`RECORDING_GRACE`], keeping whatever was captured.
pub struct PhraseListener {
    detector: PhraseDetector,
    timeout: Duration,
    recording_limit: Duration,
    recording_since: Option<Duration>,
}

impl PhraseListener {
    #[must_use]
    pub fn new(threshold: f32, timeout: Duration, phrase_time_limit: Duration) -> Self {
        Self {
            detector: PhraseDetector::new(threshold, phrase_time_limit),
            timeout,
            recording_limit: phrase_time_limit.saturating_add(RECORDING_GRACE),
            recording_since: None,
        }
    }

    /// Feed the samples read since the last poll
    ///
    /// `elapsed` is the time since listening started.
    pub fn poll(&mut self, samples: &[f32], elapsed: Duration) -> ListenStep {
        match self.detector.process(samples) {
            PhraseState::Complete => ListenStep::Phrase(self.detector.take_phrase()),
            PhraseState::Waiting => {
                self.recording_since = None;
                if elapsed >= self.timeout {
                    ListenStep::TimedOut
                } else {
                    ListenStep::Continue
                }
            }
            PhraseState::Recording => {
                let since = *self.recording_since.get_or_insert(elapsed);
                if elapsed.saturating_sub(since) < self.recording_limit {
                    return ListenStep::Continue;
                }

                tracing::warn!(
                    samples = self.detector.phrase().len(),
                    stalled = samples.is_empty(),
                    "recording ran past the phrase limit, keeping what was captured"
                );
                self.recording_since = None;
                ListenStep::Phrase(self.detector.take_phrase())
            }
        }
    }
}
