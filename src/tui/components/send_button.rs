//! # SendButton Component
//!
//! Clickable send control beside the input field. A click does exactly what
//! Enter does; the parent routes both through the same submit path.

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::tui::component::Component;

const LABEL: &str = "Send";
/// Label plus borders and one column of padding per side.
pub const SEND_BUTTON_WIDTH: u16 = LABEL.len() as u16 + 4;

pub struct SendButton {
    /// Dimmed while the input is blank
    pub enabled: bool,
}

impl SendButton {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// True if the screen cell (`column`, `row`) is inside the button drawn at `area`.
    pub fn hit_test(area: Rect, column: u16, row: u16) -> bool {
        area.contains(Position::new(column, row))
    }
}

impl Component for SendButton {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = if self.enabled {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let button = Paragraph::new(LABEL)
            .alignment(Alignment::Center)
            .style(style)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(style),
            );
        frame.render_widget(button, area);
    }
}
