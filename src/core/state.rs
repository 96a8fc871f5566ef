//! # Application State
//!
//! Core business state for robochat. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── messages: MessageLog           // append-only chat transcript
//! ├── catalog: ReplyCatalog          // canned bot replies
//! ├── avatar: AvatarController       // owns the media source
//! ├── speech: SpeechAdapter          // single-slot TTS wrapper
//! ├── stage: Stage                   // surface size + chat panel width
//! ├── rng: Box<dyn RngCore + Send>   // reply selection
//! ├── status_message: String         // status bar text
//! └── notice: Option<String>         // blocking notice (None = hidden)
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;
use std::time::Instant;

use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::avatar::AvatarController;
use crate::core::chat::{MessageLog, ReplyCatalog};
use crate::core::config::ResolvedConfig;
use crate::core::media::MediaSource;
use crate::core::surface::{Stage, Viewport};
use crate::speech::{SpeechAdapter, SpeechSynthesis};

pub struct App {
    pub messages: MessageLog,
    pub catalog: ReplyCatalog,
    pub avatar: AvatarController,
    pub speech: SpeechAdapter,
    pub stage: Stage,
    pub rng: Box<dyn RngCore + Send>,
    pub status_message: String,
    /// Message the user has to acknowledge before continuing.
    pub notice: Option<String>,
}

impl App {
    pub fn new(
        catalog: ReplyCatalog,
        avatar: AvatarController,
        speech: SpeechAdapter,
        stage: Stage,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            messages: MessageLog::new(),
            catalog,
            avatar,
            speech,
            stage,
            rng,
            status_message: String::from("Say hello to the robot"),
            notice: None,
        }
    }

    /// Build the app from resolved config. `engine` is the host's speech
    /// capability; it is ignored when speech is disabled.
    pub fn from_config(
        config: &ResolvedConfig,
        media: Box<dyn MediaSource>,
        engine: Option<Arc<dyn SpeechSynthesis>>,
        viewport: Viewport,
        now: Instant,
    ) -> Self {
        let engine = engine.filter(|_| config.speech_enabled);
        Self::new(
            ReplyCatalog::new(config.replies.clone()),
            AvatarController::new(media, now),
            SpeechAdapter::new(engine, config.speech.clone()),
            Stage::new(
                viewport,
                config.surface_width,
                config.max_surface_height,
                config.recompute_width_on_resize,
            ),
            Box::new(StdRng::from_entropy()),
        )
    }
}
