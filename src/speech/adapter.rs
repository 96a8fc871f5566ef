//! # Speech Output Adapter
//!
//! Single-slot wrapper around a [`SpeechSynthesis`] engine: every `speak`
//! cancels whatever is playing before submitting the next utterance, so at
//! most one utterance is audible at a time.
//!
//! ```text
//! speak("a") ──▶ slot = a ──▶ speak("b") ──▶ cancel(a), slot = b ──▶ finished(b) ──▶ slot = ∅
//! ```

use std::sync::Arc;

use log::{debug, info, warn};

use super::synthesizer::{SpeechError, SpeechSynthesis};
use super::types::{SpeechOptions, Utterance, UtteranceId, UtteranceRequest};

/// Handle to an in-flight utterance.
#[derive(Clone)]
pub struct UtteranceHandle {
    id: UtteranceId,
    engine: Arc<dyn SpeechSynthesis>,
}

impl UtteranceHandle {
    pub fn id(&self) -> UtteranceId {
        self.id
    }

    pub fn pause(&self) {
        self.engine.pause();
    }

    pub fn resume(&self) {
        self.engine.resume();
    }

    pub fn cancel(&self) {
        self.engine.cancel();
    }
}

impl std::fmt::Debug for UtteranceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UtteranceHandle")
            .field("id", &self.id)
            .field("engine", &self.engine.name())
            .finish()
    }
}

pub struct SpeechAdapter {
    engine: Option<Arc<dyn SpeechSynthesis>>,
    defaults: SpeechOptions,
    current: Option<UtteranceHandle>,
}

impl SpeechAdapter {
    /// `engine: None` means the host has no speech capability.
    pub fn new(engine: Option<Arc<dyn SpeechSynthesis>>, defaults: SpeechOptions) -> Self {
        Self {
            engine,
            defaults,
            current: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine_name(&self) -> Option<&str> {
        self.engine.as_deref().map(|e| e.name())
    }

    /// Cancel the current utterance, then speak `text`.
    ///
    /// `options` override the configured defaults field by field.
    pub fn speak(
        &mut self,
        text: &str,
        options: Option<&SpeechOptions>,
    ) -> Result<UtteranceHandle, SpeechError> {
        let Some(engine) = self.engine.clone() else {
            warn!("Speech requested but no speech engine is available");
            return Err(SpeechError::Unavailable);
        };

        engine.cancel();
        if let Some(previous) = self.current.take() {
            debug!("Cancelled utterance {}", previous.id);
        }

        let options = match options {
            Some(o) => self.defaults.merged(o),
            None => self.defaults.clone(),
        };
        let utterance = Utterance::new(UtteranceRequest::new(text, &options));
        let id = utterance.id;
        info!(
            "Speaking utterance {} via {} (lang={}, {} chars)",
            id,
            engine.name(),
            utterance.request.lang,
            text.chars().count()
        );
        engine.speak(utterance)?;

        let handle = UtteranceHandle {
            id,
            engine,
        };
        self.current = Some(handle.clone());
        Ok(handle)
    }

    /// Completion notification from the engine. Clears the slot only if `id`
    /// is still the current utterance.
    pub fn finished(&mut self, id: UtteranceId) -> bool {
        if self.current.as_ref().is_some_and(|h| h.id == id) {
            self.current = None;
            info!("Speech playback finished ({})", id);
            true
        } else {
            debug!("Ignoring completion of superseded utterance {}", id);
            false
        }
    }

    pub fn current(&self) -> Option<&UtteranceHandle> {
        self.current.as_ref()
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingSynthesizer, SynthCall};

    fn adapter_with(synth: &Arc<RecordingSynthesizer>) -> SpeechAdapter {
        let engine: Arc<dyn SpeechSynthesis> = synth.clone();
        SpeechAdapter::new(Some(engine), SpeechOptions::default())
    }

    #[test]
    fn test_speak_cancels_before_submitting() {
        let synth = Arc::new(RecordingSynthesizer::default());
        let mut adapter = adapter_with(&synth);

        adapter.speak("hello", None).unwrap();
        let calls = synth.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], SynthCall::Cancel);
        assert!(matches!(&calls[1], SynthCall::Speak(u) if u.request.text == "hello"));
    }

    #[test]
    fn test_second_speak_cancels_first() {
        let synth = Arc::new(RecordingSynthesizer::default());
        let mut adapter = adapter_with(&synth);

        let first = adapter.speak("one", None).unwrap();
        let second = adapter.speak("two", None).unwrap();

        let calls = synth.calls();
        // cancel, speak(one), cancel, speak(two)
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[2], SynthCall::Cancel);
        assert!(matches!(&calls[3], SynthCall::Speak(u) if u.request.text == "two"));

        assert_eq!(adapter.current().map(|h| h.id()), Some(second.id()));
        assert_ne!(first.id(), second.id());
        assert_eq!(synth.playing().len(), 1);
    }

    #[test]
    fn test_unavailable_engine_reports_error() {
        let mut adapter = SpeechAdapter::new(None, SpeechOptions::default());
        assert!(!adapter.is_available());
        assert_eq!(adapter.speak("hi", None).unwrap_err(), SpeechError::Unavailable);
        assert!(adapter.current().is_none());
    }

    #[test]
    fn test_spawn_failure_leaves_slot_empty() {
        let synth = Arc::new(RecordingSynthesizer::failing());
        let mut adapter = adapter_with(&synth);
        assert!(matches!(adapter.speak("hi", None), Err(SpeechError::Spawn(_))));
        assert!(adapter.current().is_none());
    }

    #[test]
    fn test_defaults_and_overrides_apply() {
        let synth = Arc::new(RecordingSynthesizer::default());
        let engine: Arc<dyn SpeechSynthesis> = synth.clone();
        let defaults = SpeechOptions {
            lang: Some("en-US".into()),
            rate: Some(1.2),
            ..Default::default()
        };
        let mut adapter = SpeechAdapter::new(Some(engine), defaults);

        let over = SpeechOptions {
            pitch: Some(1.5),
            ..Default::default()
        };
        adapter.speak("hi", Some(&over)).unwrap();

        let spoken = synth.spoken();
        let req = &spoken[0].request;
        assert_eq!(req.lang, "en-US");
        assert_eq!(req.rate, 1.2);
        assert_eq!(req.pitch, 1.5);
        assert_eq!(req.volume, 1.0);
    }

    #[test]
    fn test_finished_clears_only_matching_slot() {
        let synth = Arc::new(RecordingSynthesizer::default());
        let mut adapter = adapter_with(&synth);

        let first = adapter.speak("one", None).unwrap();
        let second = adapter.speak("two", None).unwrap();

        assert!(!adapter.finished(first.id()));
        assert!(adapter.current().is_some());
        assert!(adapter.finished(second.id()));
        assert!(adapter.current().is_none());
    }

    #[test]
    fn test_handle_controls_reach_engine() {
        let synth = Arc::new(RecordingSynthesizer::default());
        let mut adapter = adapter_with(&synth);
        let handle = adapter.speak("hi", None).unwrap();

        handle.pause();
        handle.resume();
        handle.cancel();

        let calls = synth.calls();
        assert_eq!(&calls[2..], &[SynthCall::Pause, SynthCall::Resume, SynthCall::Cancel]);
    }
}
