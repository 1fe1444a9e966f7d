//! Parley - a half-duplex voice dialogue loop
//!
//! Each turn listens on the microphone, transcribes what was said, matches
//! it against a handful of fixed intents, and speaks a reply. Saying
//! "goodbye" or "quit" ends the session.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   Utterance   ┌───────────────┐   Directive   ┌───────────────┐
//! │ Speech Input │ ────────────▶ │ Intent Router │ ────────────▶ │ Speech Output │
//! │  mic + STT   │               │  rule table   │               │  TTS + player │
//! └──────────────┘               └───────────────┘               └───────────────┘
//!         ▲                                                              │
//!         └────────────────── Dialogue Controller ◀──────────────────────┘
//! ```

pub mod config;
pub mod dialogue;
pub mod error;
pub mod session;
pub mod voice;

pub use config::Config;
pub use dialogue::{
    DialogueController, EndReason, Intent, ResponseDirective, SessionOutcome, Utterance,
};
pub use error::{Error, Result};
