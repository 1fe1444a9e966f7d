//! Dialogue control
//!
//! One turn is: capture an utterance, classify it, render a directive, speak
//! it. The [`DialogueController`] repeats turns until the user says goodbye.

mod controller;
mod router;

pub use controller::{DialogueController, EndReason, SessionOutcome};
pub use router::{IntentRouter, classify, render};

/// Language tag used when the caller does not pick one
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Default speech rate in words per minute
pub const DEFAULT_RATE: u32 = 150;

/// Default playback volume
pub const DEFAULT_VOLUME: f32 = 1.0;

/// One transcribed unit of speech from a single capture call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    text: String,
    language_tag: String,
}

impl Utterance {
    /// Create an utterance from a transcript and the language it was recognized in
    #[must_use]
    pub fn new(text: impl Into<String>, language_tag: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language_tag: language_tag.into(),
        }
    }

    /// Transcript text as recognized
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Language tag the transcript was requested in (e.g. `en-US`)
    #[must_use]
    pub fn language_tag(&self) -> &str {
        &self.language_tag
    }
}

/// Classified purpose of an utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// End the session
    Terminate,
    /// Greeting
    Greeting,
    /// "What is your name"
    IdentityQuery,
    /// Unwelcome solicitation that gets a fixed rebuff
    HostileSolicitation,
    /// Anything else, repeated back verbatim
    Echo(String),
}

impl Intent {
    /// Whether speaking this intent's reply should end the session
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminate)
    }
}

/// Fully-resolved response handed to the output gate
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDirective {
    /// Text to speak
    pub text: String,
    /// Speech rate in words per minute
    pub rate: u32,
    /// Volume from 0.0 to 1.0; out-of-range values are clamped by the renderer
    pub volume: f32,
}

impl ResponseDirective {
    /// Create a directive with explicit delivery parameters
    #[must_use]
    pub fn new(text: impl Into<String>, rate: u32, volume: f32) -> Self {
        Self {
            text: text.into(),
            rate,
            volume,
        }
    }

    /// Create a directive at the default rate and volume
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, DEFAULT_RATE, DEFAULT_VOLUME)
    }

    /// Prompt spoken when a capture produced no speech
    #[must_use]
    pub fn retry() -> Self {
        Self::plain("Sorry, I couldn't hear anything. Please try again.")
    }
}
