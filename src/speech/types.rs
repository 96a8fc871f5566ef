use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_LANG: &str = "zh-CN";
pub const DEFAULT_VOLUME: f32 = 1.0;
pub const DEFAULT_RATE: f32 = 1.0;
pub const DEFAULT_PITCH: f32 = 1.0;

pub type UtteranceId = Uuid;

/// Optional voice parameters. Unset fields fall back to the next layer
/// (caller → config → built-in defaults).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SpeechOptions {
    pub lang: Option<String>,
    pub volume: Option<f32>,
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
}

impl SpeechOptions {
    /// Fields set in `over` win; the rest come from `self`.
    pub fn merged(&self, over: &SpeechOptions) -> SpeechOptions {
        SpeechOptions {
            lang: over.lang.clone().or_else(|| self.lang.clone()),
            volume: over.volume.or(self.volume),
            rate: over.rate.or(self.rate),
            pitch: over.pitch.or(self.pitch),
        }
    }
}

/// A fully resolved request handed to the speech engine.
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceRequest {
    pub text: String,
    pub lang: String,
    /// 0.0 – 1.0
    pub volume: f32,
    /// 0.1 – 10.0
    pub rate: f32,
    /// 0.0 – 2.0
    pub pitch: f32,
}

impl UtteranceRequest {
    pub fn new(text: impl Into<String>, options: &SpeechOptions) -> Self {
        Self {
            text: text.into(),
            lang: options
                .lang
                .clone()
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LANG.to_string()),
            volume: options.volume.unwrap_or(DEFAULT_VOLUME).clamp(0.0, 1.0),
            rate: options.rate.unwrap_or(DEFAULT_RATE).clamp(0.1, 10.0),
            pitch: options.pitch.unwrap_or(DEFAULT_PITCH).clamp(0.0, 2.0),
        }
    }
}

/// A request tagged with the id used to track it while it plays.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub request: UtteranceRequest,
}

impl Utterance {
    pub fn new(request: UtteranceRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = UtteranceRequest::new("hi", &SpeechOptions::default());
        assert_eq!(req.lang, "zh-CN");
        assert_eq!(req.volume, 1.0);
        assert_eq!(req.rate, 1.0);
        assert_eq!(req.pitch, 1.0);
    }

    #[test]
    fn test_supplied_values_are_kept() {
        let opts = SpeechOptions {
            lang: Some("en-US".into()),
            volume: Some(0.5),
            rate: Some(1.5),
            pitch: Some(0.8),
        };
        let req = UtteranceRequest::new("hi", &opts);
        assert_eq!(req.lang, "en-US");
        assert_eq!(req.volume, 0.5);
        assert_eq!(req.rate, 1.5);
        assert_eq!(req.pitch, 0.8);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let opts = SpeechOptions {
            lang: Some("  ".into()),
            volume: Some(3.0),
            rate: Some(0.0),
            pitch: Some(-1.0),
        };
        let req = UtteranceRequest::new("hi", &opts);
        assert_eq!(req.lang, DEFAULT_LANG);
        assert_eq!(req.volume, 1.0);
        assert_eq!(req.rate, 0.1);
        assert_eq!(req.pitch, 0.0);
    }

    #[test]
    fn test_merge_prefers_override() {
        let base = SpeechOptions {
            lang: Some("en-GB".into()),
            volume: Some(0.3),
            ..Default::default()
        };
        let over = SpeechOptions {
            volume: Some(0.9),
            rate: Some(2.0),
            ..Default::default()
        };
        let merged = base.merged(&over);
        assert_eq!(merged.lang.as_deref(), Some("en-GB"));
        assert_eq!(merged.volume, Some(0.9));
        assert_eq!(merged.rate, Some(2.0));
        assert_eq!(merged.pitch, None);
    }

    #[test]
    fn test_utterance_ids_are_unique() {
        let req = UtteranceRequest::new("hi", &SpeechOptions::default());
        assert_ne!(Utterance::new(req.clone()).id, Utterance::new(req).id);
    }
}
