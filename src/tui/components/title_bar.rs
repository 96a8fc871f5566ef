//! # TitleBar Component
//!
//! One-line header of the chat panel:
//!
//! ```text
//! robochat | avatar: talking | voice: espeak-ng | 4 messages
//! robochat | avatar: walking | speech off
//! ```
//!
//! Purely presentational: every field is a prop copied from `App` by the
//! parent each frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::core::avatar::AnimationState;
use crate::tui::component::Component;

pub struct TitleBar {
    pub avatar_state: AnimationState,
    /// Speech engine name, `None` when speech is unavailable
    pub voice: Option<String>,
    pub status_message: String,
}

impl TitleBar {
    pub fn new(avatar_state: AnimationState, voice: Option<String>, status_message: String) -> Self {
        Self {
            avatar_state,
            voice,
            status_message,
        }
    }

    pub fn text(&self) -> String {
        let voice = match &self.voice {
            Some(name) => format!("voice: {name}"),
            None => "speech off".to_string(),
        };
        let mut text = format!("robochat | avatar: {} | {}", self.avatar_state.label(), voice);
        if !self.status_message.is_empty() {
            text.push_str(" | ");
            text.push_str(&self.status_message);
        }
        text
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = match self.avatar_state {
            AnimationState::Talking => Style::default().fg(Color::Yellow),
            AnimationState::Greeting => Style::default().fg(Color::Cyan),
            AnimationState::Walking => Style::default(),
        };
        frame.render_widget(Line::from(Span::styled(self.text(), style)), area);
    }
}
