//! # Actions
//!
//! Everything that can happen in robochat becomes an `Action`.
//! User presses Enter? That's `Action::Submit { .. }`.
//! Speech engine finishes? That's `Action::SpeechFinished(id)`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state and tells the adapter what to do next through an `Effect`.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Time never comes from the clock here: every timed action carries its
//! `Instant`, so a test can replay an exact session.

use std::time::Instant;

use log::{debug, info, warn};

use crate::core::avatar::AnimationState;
use crate::core::chat::MessageEntry;
use crate::core::state::App;
use crate::core::surface::Viewport;
use crate::speech::{SpeechError, UtteranceId};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Send button or Enter. `text` is the raw input value.
    Submit { text: String, at: Instant },
    /// One UI loop iteration; fires due avatar reversions.
    Tick(Instant),
    Resize(Viewport),
    SpeechFinished(UtteranceId),
    DismissNotice,
    Quit,
}

/// What the adapter should do after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Redraw,
    /// New entries were appended; pin the message list to its end.
    ScrollToBottom,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit { text, at } => submit(app, &text, at),
        Action::Tick(now) => {
            if app.avatar.tick(now) {
                Effect::Redraw
            } else {
                Effect::None
            }
        }
        Action::Resize(viewport) => {
            app.stage.resize(viewport);
            Effect::Redraw
        }
        Action::SpeechFinished(id) => {
            app.speech.finished(id);
            Effect::None
        }
        Action::DismissNotice => {
            app.notice = None;
            Effect::Redraw
        }
        Action::Quit => {
            info!("Quit requested");
            app.speech.cancel();
            Effect::Quit
        }
    }
}

/// User entry, random reply, speech, then the talking animation.
fn submit(app: &mut App, text: &str, at: Instant) -> Effect {
    let text = text.trim();
    if text.is_empty() {
        debug!("Ignoring blank submit");
        return Effect::None;
    }

    app.messages.push(MessageEntry::user(text));

    let reply = app.catalog.pick(&mut *app.rng).to_string();
    debug!(
        "Submit: {} chars in, replying with {} chars",
        text.chars().count(),
        reply.chars().count()
    );

    // A failed speech request still gets a bot entry and the talking animation.
    // Only a missing engine is shown to the user.
    match app.speech.speak(&reply, None) {
        Ok(_) => {}
        Err(SpeechError::Unavailable) => {
            warn!("Speech output unavailable");
            app.notice = Some(SpeechError::Unavailable.to_string());
        }
        Err(e) => warn!("Speech output failed: {}", e),
    }

    app.messages.push(MessageEntry::bot(reply));
    app.avatar.transition(AnimationState::Talking, at);
    app.status_message = format!("{} messages", app.messages.len());
    Effect::ScrollToBottom
}
