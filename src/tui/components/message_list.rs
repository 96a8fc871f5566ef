//! # MessageList Component
//!
//! Scrollable view of the chat transcript.
//!
//! ## Responsibilities
//!
//! - Display the message log
//! - Keep the newest entry in view ("scroll to end") unless the user
//!   scrolled away
//! - Cache message heights between frames
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the `MessageLog` (props).
//! The log is append-only, so cached heights stay valid until the width
//! changes.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::chat::MessageLog;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;

/// Scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    /// Per-message heights for `content_width`
    pub heights: Vec<u16>,
    content_width: u16,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            heights: Vec::new(),
            content_width: 0,
            stick_to_bottom: true,
            viewport_height: 0,
        }
    }

    fn total_height(&self) -> u16 {
        self.heights.iter().fold(0u16, |acc, h| acc.saturating_add(*h))
    }

    fn max_offset(&self) -> u16 {
        self.total_height().saturating_sub(self.viewport_height)
    }

    /// Pin the view to the newest entry.
    pub fn scroll_to_bottom(&mut self) {
        self.stick_to_bottom = true;
        self.jump_to_end();
    }

    fn jump_to_end(&mut self) {
        let x = self.scroll_state.offset().x;
        self.scroll_state.set_offset(Position {
            x,
            y: self.max_offset(),
        });
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll once the user scrolls back down to the end.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Bring the height cache in line with `messages` at `content_width`.
    fn update_heights(&mut self, messages: &MessageLog, content_width: u16) {
        if content_width != self.content_width || self.heights.len() > messages.len() {
            self.heights.clear();
            self.content_width = content_width;
        }
        let known = self.heights.len();
        self.heights.extend(
            messages.entries()[known..]
                .iter()
                .map(|entry| Message::calculate_height(entry, content_width)),
        );
    }
}

/// Scrollable transcript component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a MessageLog,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut MessageListState, messages: &'a MessageLog) -> Self {
        Self { state, messages }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        self.state.update_heights(self.messages, content_width);
        self.state.viewport_height = area.height;
        if self.state.stick_to_bottom {
            self.state.jump_to_end();
        } else {
            self.state.clamp_scroll();
        }

        let total_height = self.state.total_height();
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        // Only draw what intersects the viewport
        let top = self.state.scroll_state.offset().y;
        let bottom = top.saturating_add(area.height);
        let mut y: u16 = 0;
        for (entry, &height) in self.messages.entries().iter().zip(&self.state.heights) {
            let next = y.saturating_add(height);
            if next > top && y < bottom {
                scroll_view.render_widget(
                    Message::new(entry),
                    Rect::new(0, y, content_width, height),
                );
            }
            y = next;
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Implemented on the state: scrolling outlives the per-frame component.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollToBottom => self.scroll_to_bottom(),
            _ => {}
        }
        None
    }
}
