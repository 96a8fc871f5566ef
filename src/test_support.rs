//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::{Arc, Mutex};
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::avatar::AvatarController;
use crate::core::chat::ReplyCatalog;
use crate::core::media::{Frame, MediaSource, PlaybackFlags};
use crate::core::state::App;
use crate::core::surface::{
    DEFAULT_SURFACE_WIDTH, DrawingSurface, MAX_SURFACE_HEIGHT, Stage, SurfaceSize, Viewport,
};
use crate::speech::{SpeechAdapter, SpeechError, SpeechOptions, SpeechSynthesis, Utterance};

pub const TEST_SEED: u64 = 7;
pub const TEST_VIEWPORT: Viewport = Viewport {
    width: 120,
    height: 40,
};

// ============================================================================
// Media
// ============================================================================

/// Media source that records every `play()` and serves a fixed frame.
#[derive(Default)]
pub struct RecordingMedia {
    url: String,
    flags: PlaybackFlags,
    frame: Option<Frame>,
    pub plays: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl RecordingMedia {
    pub fn with_frame(text: &str) -> Self {
        Self {
            frame: Some(Frame::from_text(text)),
            ..Default::default()
        }
    }
}

impl MediaSource for RecordingMedia {
    fn set_source(&mut self, url: &str) {
        self.url = url.to_string();
    }

    fn source(&self) -> &str {
        &self.url
    }

    fn set_flags(&mut self, flags: PlaybackFlags) {
        self.flags = flags;
    }

    fn flags(&self) -> PlaybackFlags {
        self.flags
    }

    fn play(&mut self, now: Instant) {
        if let Ok(mut plays) = self.plays.lock() {
            plays.push((self.url.clone(), now));
        }
    }

    fn current_frame(&self, _now: Instant) -> Option<&Frame> {
        self.frame.as_ref()
    }
}

// ============================================================================
// Drawing surface
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    Clear(u16, u16, u16, u16),
    Draw(u16, u16, u16, u16),
}

/// Drawing surface that only logs the calls made on it.
pub struct RecordingSurface {
    size: SurfaceSize,
    pub ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }
}

impl DrawingSurface for RecordingSurface {
    fn width(&self) -> u16 {
        self.size.width
    }

    fn height(&self) -> u16 {
        self.size.height
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn clear_rect(&mut self, x: u16, y: u16, width: u16, height: u16) {
        self.ops.push(SurfaceOp::Clear(x, y, width, height));
    }

    fn draw_image(&mut self, _frame: &Frame, x: u16, y: u16, width: u16, height: u16) {
        self.ops.push(SurfaceOp::Draw(x, y, width, height));
    }
}

// ============================================================================
// Speech
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SynthCall {
    Speak(Utterance),
    Cancel,
    Pause,
    Resume,
}

/// Speech engine that records calls instead of making sound.
#[derive(Default)]
pub struct RecordingSynthesizer {
    fail: bool,
    calls: Mutex<Vec<SynthCall>>,
    playing: Mutex<Vec<Utterance>>,
}

impl RecordingSynthesizer {
    /// An engine whose every `speak` fails to start.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<SynthCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Every utterance submitted, in order.
    pub fn spoken(&self) -> Vec<Utterance> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SynthCall::Speak(u) => Some(u),
                _ => None,
            })
            .collect()
    }

    /// Utterances submitted since the last cancel.
    pub fn playing(&self) -> Vec<Utterance> {
        self.playing.lock().unwrap().clone()
    }
}

impl SpeechSynthesis for RecordingSynthesizer {
    fn name(&self) -> &str {
        "recording"
    }

    fn speak(&self, utterance: Utterance) -> Result<(), SpeechError> {
        self.calls
            .lock()
            .unwrap()
            .push(SynthCall::Speak(utterance.clone()));
        if self.fail {
            return Err(SpeechError::Spawn("recording engine told to fail".to_string()));
        }
        self.playing.lock().unwrap().push(utterance);
        Ok(())
    }

    fn cancel(&self) {
        self.calls.lock().unwrap().push(SynthCall::Cancel);
        self.playing.lock().unwrap().clear();
    }

    fn pause(&self) {
        self.calls.lock().unwrap().push(SynthCall::Pause);
    }

    fn resume(&self) {
        self.calls.lock().unwrap().push(SynthCall::Resume);
    }
}

// ============================================================================
// App
// ============================================================================

/// Creates a test App with a recording speech engine and a seeded RNG.
pub fn test_app() -> App {
    let engine: Arc<dyn SpeechSynthesis> = Arc::new(RecordingSynthesizer::default());
    test_app_with(Some(engine), Instant::now())
}

/// Creates a test App around `engine` (`None` = no speech capability),
/// started at `start`.
pub fn test_app_with(engine: Option<Arc<dyn SpeechSynthesis>>, start: Instant) -> App {
    let avatar = AvatarController::new(Box::new(RecordingMedia::default()), start);
    App::new(
        ReplyCatalog::default(),
        avatar,
        SpeechAdapter::new(engine, SpeechOptions::default()),
        Stage::new(TEST_VIEWPORT, DEFAULT_SURFACE_WIDTH, MAX_SURFACE_HEIGHT, false),
        Box::new(StdRng::seed_from_u64(TEST_SEED)),
    )
}
