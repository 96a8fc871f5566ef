//! # Notice Component
//!
//! Blocking modal for messages the user must acknowledge, such as missing
//! text-to-speech support. While it is open every event goes to it; Enter or
//! Esc dismisses it.
//!
//! Transient wrapper around the message held in `App::notice`.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::tui::component::Component;
use crate::tui::event::TuiEvent;

/// Events emitted by the notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeEvent {
    Dismiss,
}

/// Map an event while the notice is open. Everything else is swallowed.
pub fn handle_notice_event(event: &TuiEvent) -> Option<NoticeEvent> {
    match event {
        TuiEvent::Submit | TuiEvent::Escape => Some(NoticeEvent::Dismiss),
        _ => None,
    }
}

pub struct Notice<'a> {
    message: &'a str,
}

impl<'a> Notice<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }
}

impl<'a> Component for Notice<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 30, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Notice ")
            .title_bottom(Line::from(" Enter OK ").centered())
            .padding(Padding::uniform(1));

        let body = Paragraph::new(self.message)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(body, overlay);
    }
}

/// Compute a centered rect using percentage of the outer rect.
fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
