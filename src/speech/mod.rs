//! # Speech Output
//!
//! Text-to-speech for the robot's replies.
//!
//! ```text
//! SpeechAdapter (single current utterance)
//!        │ cancel() then speak(Utterance)
//!        ▼
//! dyn SpeechSynthesis ──▶ CommandSynthesizer (espeak-ng / espeak / spd-say / say)
//! ```
//!
//! A missing engine is not fatal: the adapter reports
//! [`SpeechError::Unavailable`] and the caller decides how to tell the user.

pub mod adapter;
pub mod engines;
pub mod synthesizer;
pub mod types;

pub use adapter::{SpeechAdapter, UtteranceHandle};
pub use engines::{CommandSynthesizer, EngineKind};
pub use synthesizer::{SpeechError, SpeechSynthesis};
pub use types::{SpeechOptions, Utterance, UtteranceId, UtteranceRequest, DEFAULT_LANG};
