use std::fmt;

use super::types::Utterance;

/// Errors from the speech output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// The host has no text-to-speech engine. Shown to the user.
    Unavailable,
    /// The engine exists but could not start the utterance.
    Spawn(String),
}

impl fmt::Display for SpeechError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechError::Unavailable => write!(
                f,
                "Text-to-speech is not available on this system. \
                 Install espeak-ng, spd-say or say, then restart robochat."
            ),
            SpeechError::Spawn(msg) => write!(f, "speech engine failed to start: {msg}"),
        }
    }
}

impl std::error::Error for SpeechError {}

/// Host capability: a platform speech synthesizer.
///
/// `speak` submits and returns immediately; playback is asynchronous.
/// `cancel` silences everything the engine is currently playing.
pub trait SpeechSynthesis: Send + Sync {
    /// Returns the name of the engine.
    fn name(&self) -> &str;

    fn speak(&self, utterance: Utterance) -> Result<(), SpeechError>;

    fn cancel(&self);

    fn pause(&self) {}

    fn resume(&self) {}
}
