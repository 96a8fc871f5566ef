//! Page layout and the per-frame draw.
//!
//! ```text
//! ┌──────────────┬──────────────────────────────┐
//! │              │ title bar                    │
//! │   avatar     ├──────────────────────────────┤
//! │   surface    │ messages                     │
//! │  (W x H)     │                              │
//! │              ├────────────────────┬─────────┤
//! │              │ input              │ [Send]  │
//! └──────────────┴────────────────────┴─────────┘
//!                 ◀── at most panel_max_width ──▶
//! ```

use std::time::Instant;

use log::trace;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::App;
use crate::core::surface::{DrawingSurface, Stage, render_frame};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{
    AvatarCanvas, MessageList, Notice, SEND_BUTTON_WIDTH, SendButton, TitleBar,
};

const TITLE_HEIGHT: u16 = 1;
const INPUT_HEIGHT: u16 = 3;

/// Screen regions of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageLayout {
    pub avatar: Rect,
    pub title: Rect,
    pub messages: Rect,
    pub input: Rect,
    pub send: Rect,
}

pub fn page_layout(area: Rect, stage: &Stage) -> PageLayout {
    let surface = stage.surface();
    let [avatar_col, rest] =
        Layout::horizontal([Constraint::Length(surface.width), Constraint::Min(0)]).areas(area);
    let avatar = Rect {
        height: avatar_col.height.min(surface.height),
        ..avatar_col
    };

    let panel = Rect {
        width: rest.width.min(stage.panel_max_width()),
        ..rest
    };
    let [title, messages, input_row] = Layout::vertical([
        Constraint::Length(TITLE_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(INPUT_HEIGHT),
    ])
    .areas(panel);
    let [input, send] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(SEND_BUTTON_WIDTH)])
            .areas(input_row);

    PageLayout {
        avatar,
        title,
        messages,
        input,
        send,
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, now: Instant) {
    let layout = page_layout(frame.area(), &app.stage);
    tui.layout = layout;

    // Render loop: clear the surface and copy the current media frame onto it
    tui.surface.resize(app.stage.surface());
    if !render_frame(&mut tui.surface, app.avatar.media(), now) {
        trace!("No media frame for {}", app.avatar.media().source());
    }
    frame.render_widget(AvatarCanvas::new(&tui.surface), layout.avatar);

    TitleBar::new(
        app.avatar.state(),
        app.speech.engine_name().map(str::to_string),
        app.status_message.clone(),
    )
    .render(frame, layout.title);

    MessageList::new(&mut tui.message_list, &app.messages).render(frame, layout.messages);
    tui.input_box.render(frame, layout.input);
    SendButton::new(!tui.input_box.buffer.trim().is_empty()).render(frame, layout.send);

    if let Some(message) = &app.notice {
        Notice::new(message).render(frame, frame.area());
    }
}
