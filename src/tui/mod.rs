//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the page and
//! translates terminal events into `core::Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Loop
//!
//! Each iteration:
//!
//! 1. `Action::Tick(now)` fires any due avatar reversion
//! 2. the page is drawn, copying the media's current frame onto the surface
//! 3. events are polled, with a timeout no longer than one frame interval
//!    and never past the next reversion deadline
//! 4. actions from background tasks (speech completion) are applied
//!
//! The avatar animates continuously, so every iteration redraws.

mod component;
mod components;
mod event;
mod ui;

use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::media::{ClipLibrary, ClipPlayer};
use crate::core::state::App;
use crate::core::surface::{SurfaceSize, Viewport};
use crate::speech::{CommandSynthesizer, SpeechSynthesis};
use crate::tui::component::EventHandler;
use crate::tui::components::notice::handle_notice_event;
use crate::tui::components::{
    CellSurface, InputBox, InputEvent, MessageListState, NoticeEvent, SendButton,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::ui::PageLayout;

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    /// The avatar's drawing surface
    pub surface: CellSurface,
    /// Regions of the last drawn frame (for mouse hit testing)
    pub layout: PageLayout,
}

impl TuiState {
    pub fn new(surface: SurfaceSize) -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            surface: CellSurface::new(surface),
            layout: PageLayout::default(),
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste
        );
    }
}

/// Find the host's speech engine. Completion is reported back to the loop
/// as `Action::SpeechFinished`.
pub fn build_speech_engine(
    config: &ResolvedConfig,
    tx: mpsc::Sender<Action>,
) -> Option<Arc<dyn SpeechSynthesis>> {
    if !config.speech_enabled {
        info!("Speech disabled by configuration");
        return None;
    }
    let engine = CommandSynthesizer::detect(config.speech_command.as_deref())?.on_finished(
        move |id| {
            if tx.send(Action::SpeechFinished(id)).is_err() {
                warn!("Failed to report finished utterance {}: receiver dropped", id);
            }
        },
    );
    Some(Arc::new(engine))
}

fn build_clip_library(config: &ResolvedConfig) -> ClipLibrary {
    match &config.asset_dir {
        Some(dir) => ClipLibrary::with_asset_dir(dir.clone()),
        None => ClipLibrary::builtin(),
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let engine = build_speech_engine(&config, tx);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let size = terminal.size()?;
    let viewport = Viewport::new(size.width, size.height);
    let media = Box::new(ClipPlayer::new(build_clip_library(&config)));
    let mut app = App::from_config(&config, media, engine, viewport, Instant::now());
    let mut tui = TuiState::new(app.stage.surface());

    let frame_interval = Duration::from_millis(1000 / u64::from(config.fps.max(1)));
    info!(
        "robochat running: viewport {}x{}, surface {}x{}, panel {}",
        viewport.width,
        viewport.height,
        app.stage.surface().width,
        app.stage.surface().height,
        app.stage.panel_max_width()
    );

    let mut should_quit = false;
    while !should_quit {
        let now = Instant::now();
        update(&mut app, Action::Tick(now));
        terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, now))?;

        // Wake for the next frame, or earlier if a reversion is due
        let timeout = app
            .avatar
            .next_deadline()
            .map(|due| due.saturating_duration_since(now).min(frame_interval))
            .unwrap_or(frame_interval);
        let first_event = poll_event_timeout(timeout);

        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(&mut app, &mut tui, event) == Effect::Quit {
                should_quit = true;
                break;
            }
        }

        // Handle background task actions (speech completion)
        while let Ok(action) = rx.try_recv() {
            debug!("Event loop received: {:?}", action);
            if update(&mut app, action) == Effect::Quit {
                should_quit = true;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

/// Route one terminal event. Returns the effect of any core update it caused.
fn handle_event(app: &mut App, tui: &mut TuiState, event: TuiEvent) -> Effect {
    // ForceQuit always quits, even under a notice
    if matches!(event, TuiEvent::ForceQuit) {
        return update(app, Action::Quit);
    }

    if let TuiEvent::Resize(width, height) = event {
        return update(app, Action::Resize(Viewport::new(width, height)));
    }

    // The notice is modal: it gets every event until dismissed
    if app.notice.is_some() {
        return match handle_notice_event(&event) {
            Some(NoticeEvent::Dismiss) => update(app, Action::DismissNotice),
            None => Effect::None,
        };
    }

    match event {
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(&event);
            Effect::None
        }
        TuiEvent::ScrollToBottom => {
            tui.message_list.handle_event(&event);
            tui.input_box.handle_event(&event);
            Effect::None
        }
        TuiEvent::MouseClick(column, row) => {
            if SendButton::hit_test(tui.layout.send, column, row) {
                match tui.input_box.take_submission() {
                    Some(text) => submit(app, tui, text),
                    None => Effect::None,
                }
            } else {
                Effect::None
            }
        }
        _ => match tui.input_box.handle_event(&event) {
            Some(InputEvent::Submit(text)) => submit(app, tui, text),
            Some(InputEvent::ContentChanged) | None => Effect::None,
        },
    }
}

/// Shared by Enter and the send button.
fn submit(app: &mut App, tui: &mut TuiState, text: String) -> Effect {
    let effect = update(
        app,
        Action::Submit {
            text,
            at: Instant::now(),
        },
    );
    if effect == Effect::ScrollToBottom {
        tui.message_list.scroll_to_bottom();
    }
    effect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::avatar::AnimationState;
    use crate::test_support::{test_app, test_app_with};
    use ratatui::layout::Rect;

    fn type_text(app: &mut App, tui: &mut TuiState, text: &str) {
        for c in text.chars() {
            handle_event(app, tui, TuiEvent::InputChar(c));
        }
    }

    #[test]
    fn test_enter_submits_and_clears_input() {
        let mut app = test_app();
        let mut tui = TuiState::new(app.stage.surface());

        type_text(&mut app, &mut tui, "hello");
        let effect = handle_event(&mut app, &mut tui, TuiEvent::Submit);

        assert_eq!(effect, Effect::ScrollToBottom);
        assert!(tui.input_box.buffer.is_empty());
        assert_eq!(app.messages.len(), 2);
        assert!(tui.message_list.stick_to_bottom);
        assert_eq!(app.avatar.state(), AnimationState::Talking);
    }

    #[test]
    fn test_send_button_click_matches_enter() {
        let mut app = test_app();
        let mut tui = TuiState::new(app.stage.surface());
        tui.layout.send = Rect::new(100, 37, 8, 3);

        type_text(&mut app, &mut tui, "hello");
        // A click elsewhere does nothing
        handle_event(&mut app, &mut tui, TuiEvent::MouseClick(50, 10));
        assert!(app.messages.is_empty());

        let effect = handle_event(&mut app, &mut tui, TuiEvent::MouseClick(101, 38));
        assert_eq!(effect, Effect::ScrollToBottom);
        assert_eq!(app.messages.entries()[0].to_string(), "user:hello");
        assert!(tui.input_box.buffer.is_empty());
    }

    #[test]
    fn test_blank_input_is_kept_and_not_submitted() {
        let mut app = test_app();
        let mut tui = TuiState::new(app.stage.surface());
        tui.layout.send = Rect::new(100, 37, 8, 3);

        type_text(&mut app, &mut tui, "  ");
        assert_eq!(handle_event(&mut app, &mut tui, TuiEvent::Submit), Effect::None);
        assert_eq!(
            handle_event(&mut app, &mut tui, TuiEvent::MouseClick(101, 38)),
            Effect::None
        );
        assert_eq!(tui.input_box.buffer, "  ");
        assert!(app.messages.is_empty());
    }

    #[test]
    fn test_notice_blocks_input_until_dismissed() {
        let mut app = test_app_with(None, Instant::now());
        let mut tui = TuiState::new(app.stage.surface());

        type_text(&mut app, &mut tui, "hi");
        handle_event(&mut app, &mut tui, TuiEvent::Submit);
        assert!(app.notice.is_some());

        // Typing is swallowed while the notice is up
        handle_event(&mut app, &mut tui, TuiEvent::InputChar('x'));
        assert!(tui.input_box.buffer.is_empty());

        handle_event(&mut app, &mut tui, TuiEvent::Submit);
        assert!(app.notice.is_none());
        assert_eq!(app.messages.len(), 2);
    }

    #[test]
    fn test_force_quit_and_resize() {
        let mut app = test_app();
        let mut tui = TuiState::new(app.stage.surface());

        assert_eq!(
            handle_event(&mut app, &mut tui, TuiEvent::Resize(80, 20)),
            Effect::Redraw
        );
        assert_eq!(app.stage.surface(), SurfaceSize::new(20, 20));
        assert_eq!(handle_event(&mut app, &mut tui, TuiEvent::ForceQuit), Effect::Quit);
    }

    #[test]
    fn test_speech_disabled_builds_no_engine() {
        let (tx, _rx) = mpsc::channel();
        let config = ResolvedConfig {
            speech_enabled: false,
            ..ResolvedConfig::default()
        };
        assert!(build_speech_engine(&config, tx).is_none());
    }
}
