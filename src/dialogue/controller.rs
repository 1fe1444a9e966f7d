//! Dialogue control loop

use governor::{Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::NotKeyed};

use super::{IntentRouter, ResponseDirective};
use crate::Result;
use crate::config::{CaptureConfig, SessionConfig};
use crate::voice::{Capture, SpeechInput, SpeechOutput};

type RetryLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The user asked to quit
    Terminated,
    /// Too many consecutive turns without speech
    RetriesExhausted,
}

/// Summary of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Completed turns, retries included
    pub turns: u64,
    /// Why the loop stopped
    pub reason: EndReason,
}

/// Per-session state, reset at the start of every [`DialogueController::run`]
#[derive(Debug, Default)]
struct SessionState {
    ended: Option<EndReason>,
    turns: u64,
    consecutive_retries: u32,
}

/// Owns the listen → classify → speak loop
///
/// Capture and playback go through the two gates in strict sequence, so the
/// audio devices are never in use at the same time.
pub struct DialogueController<I, O> {
    input: I,
    output: O,
    router: IntentRouter,
    capture: CaptureConfig,
    session: SessionConfig,
    retry_limiter: Option<RetryLimiter>,
    state: SessionState,
}

impl<I: SpeechInput, O: SpeechOutput> DialogueController<I, O> {
    /// Create a controller over caller-owned gates
    #[must_use]
    pub fn new(input: I, output: O, capture: CaptureConfig, session: SessionConfig) -> Self {
        let retry_limiter = Quota::with_period(session.retry_interval).map(RetryLimiter::direct);

        Self {
            input,
            output,
            router: IntentRouter,
            capture,
            session,
            retry_limiter,
            state: SessionState::default(),
        }
    }

    /// Run turns until the user quits or the retry bound is reached
    ///
    /// # Errors
    ///
    /// Returns error if the input gate fails hard (device or recognition
    /// service unavailable). Synthesis failures only lose the current turn.
    #[allow(clippy::future_not_send)]
    pub async fn run(&mut self) -> Result<SessionOutcome> {
        self.state = SessionState::default();

        tracing::info!(
            language = %self.capture.language,
            timeout = ?self.capture.timeout,
            phrase_time_limit = ?self.capture.phrase_time_limit,
            max_retries = ?self.session.max_consecutive_retries,
            "starting dialogue session"
        );

        let reason = loop {
            self.turn().await?;
            self.state.turns += 1;

            if let Some(reason) = self.state.ended {
                break reason;
            }
        };

        tracing::info!(turns = self.state.turns, ?reason, "dialogue session ended");

        Ok(SessionOutcome {
            turns: self.state.turns,
            reason,
        })
    }

    /// Number of turns completed in the current or last session
    #[must_use]
    pub const fn turns(&self) -> u64 {
        self.state.turns
    }

    /// Give back the gates, e.g. to tear them down explicitly
    pub fn into_gates(self) -> (I, O) {
        (self.input, self.output)
    }

    /// Run one capture → respond turn
    #[allow(clippy::future_not_send)]
    async fn turn(&mut self) -> Result<()> {
        let capture = self
            .input
            .capture(
                &self.capture.language,
                self.capture.timeout,
                self.capture.phrase_time_limit,
            )
            .await?;

        match capture {
            Capture::Heard(utterance) => {
                self.state.consecutive_retries = 0;
                tracing::info!(text = utterance.text(), "heard");

                let (intent, directive) = self.router.route(&utterance);
                self.deliver(&directive).await?;

                if intent.is_terminal() {
                    self.state.ended = Some(EndReason::Terminated);
                }
            }
            Capture::NoSpeech => {
                self.state.consecutive_retries += 1;
                tracing::info!(
                    consecutive = self.state.consecutive_retries,
                    "no input detected, trying again"
                );

                self.deliver(&ResponseDirective::retry()).await?;

                let exhausted = self
                    .session
                    .max_consecutive_retries
                    .is_some_and(|max| self.state.consecutive_retries >= max);

                if exhausted {
                    tracing::warn!(
                        retries = self.state.consecutive_retries,
                        "retry limit reached"
                    );
                    self.state.ended = Some(EndReason::RetriesExhausted);
                } else if let Some(limiter) = &self.retry_limiter {
                    limiter.until_ready().await;
                }
            }
        }

        Ok(())
    }

    /// Hand a directive to the output gate
    #[allow(clippy::future_not_send)]
    async fn deliver(&mut self, directive: &ResponseDirective) -> Result<()> {
        match self.output.speak(directive, self.session.persist).await {
            Ok(()) => Ok(()),
            Err(e) if !e.is_fatal_to_session() => {
                tracing::error!(error = %e, text = %directive.text, "could not speak response");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
