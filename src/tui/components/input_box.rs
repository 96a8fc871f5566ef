//! # InputBox Component
//!
//! Single-line text field of the chat panel.
//!
//! ## Responsibilities
//!
//! - Capture text input (typing, paste, backspace/delete, cursor movement)
//! - Hand the buffer over on submission
//! - Scroll horizontally so the cursor stays visible
//!
//! Submission is shared with the send button: both go through
//! [`InputBox::take_submission`]. A buffer that trims to nothing is never
//! handed over and is left exactly as typed.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Border columns (left + right).
const HORIZONTAL_OVERHEAD: u16 = 2;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed)
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    /// Text buffer (Internal State)
    pub buffer: String,
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    cursor: usize,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Take the buffer for submission, clearing the field. Blank buffers are
    /// left untouched and yield `None`.
    pub fn take_submission(&mut self) -> Option<String> {
        if self.buffer.trim().is_empty() {
            return None;
        }
        self.cursor = 0;
        Some(std::mem::take(&mut self.buffer))
    }

    fn insert_str(&mut self, text: &str) {
        // Single-line field: pasted line breaks become spaces
        let text: String = text
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        self.buffer.insert_str(self.cursor, &text);
        self.cursor += text.len();
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.buffer.len())
    }

    /// The slice of the buffer shown in a field `width` columns wide, and the
    /// cursor's column within it.
    fn visible_window(&self, width: u16) -> (&str, u16) {
        let width = width as usize;
        if width == 0 {
            return ("", 0);
        }

        // Drop characters from the left until the cursor fits
        let mut start = 0;
        let mut cursor_col: usize = self.buffer[..self.cursor]
            .chars()
            .map(|c| c.width().unwrap_or(0))
            .sum();
        let mut chars = self.buffer[..self.cursor].char_indices();
        while cursor_col >= width {
            match chars.next() {
                Some((_, c)) => {
                    cursor_col -= c.width().unwrap_or(0);
                    start += c.len_utf8();
                }
                None => break,
            }
        }
        (&self.buffer[start..], cursor_col as u16)
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner_width = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        let (visible, cursor_col) = self.visible_window(inner_width);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title("Message");
        let input = Paragraph::new(visible)
            .block(block)
            .style(Style::default().fg(Color::Green));
        frame.render_widget(input, area);

        if area.width > HORIZONTAL_OVERHEAD && area.height > 2 {
            frame.set_cursor_position((area.x + 1 + cursor_col, area.y + 1));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.insert_str(text);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor > 0 {
                    let prev = self.prev_boundary();
                    self.buffer.drain(prev..self.cursor);
                    self.cursor = prev;
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::Delete => {
                if self.cursor < self.buffer.len() {
                    let next = self.next_boundary();
                    self.buffer.drain(self.cursor..next);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = self.prev_boundary();
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = self.next_boundary();
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorHome => (self.cursor != 0).then(|| {
                self.cursor = 0;
                InputEvent::ContentChanged
            }),
            // End also moves the cursor to the end of the line
            TuiEvent::ScrollToBottom => (self.cursor != self.buffer.len()).then(|| {
                self.cursor = self.buffer.len();
                InputEvent::ContentChanged
            }),
            TuiEvent::Submit => self.take_submission().map(InputEvent::Submit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_event(&TuiEvent::InputChar(c));
        }
        input
    }

    #[test]
    fn test_handle_input() {
        let mut input = InputBox::new();

        let res = input.handle_event(&TuiEvent::InputChar('a'));
        assert_eq!(res, Some(InputEvent::ContentChanged));
        input.handle_event(&TuiEvent::InputChar('b'));
        assert_eq!(input.buffer, "ab");

        let res = input.handle_event(&TuiEvent::Backspace);
        assert_eq!(res, Some(InputEvent::ContentChanged));
        assert_eq!(input.buffer, "a");
    }

    #[test]
    fn test_submit_clears_buffer() {
        let mut input = typed("hello");

        let res = input.handle_event(&TuiEvent::Submit);
        assert_eq!(res, Some(InputEvent::Submit("hello".to_string())));
        assert!(input.buffer.is_empty(), "Buffer should be cleared after submit");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_blank_submit_leaves_buffer_alone() {
        let mut input = typed("   ");
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.buffer, "   ");
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn test_submission_is_untrimmed() {
        // Trimming is the core's job
        let mut input = typed(" hi ");
        assert_eq!(input.take_submission(), Some(" hi ".to_string()));
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = typed("你好");
        input.handle_event(&TuiEvent::CursorLeft);
        input.handle_event(&TuiEvent::InputChar('a'));
        assert_eq!(input.buffer, "你a好");

        input.handle_event(&TuiEvent::Delete);
        assert_eq!(input.buffer, "你a");
        input.handle_event(&TuiEvent::CursorHome);
        input.handle_event(&TuiEvent::Delete);
        assert_eq!(input.buffer, "a");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("one\ntwo".to_string()));
        assert_eq!(input.buffer, "one two");
        assert_eq!(input.cursor(), input.buffer.len());
    }

    #[test]
    fn test_visible_window_follows_cursor() {
        let input = typed("abcdefghij");
        let (visible, col) = input.visible_window(4);
        assert_eq!(visible, "hij");
        assert_eq!(col, 3);

        let short = typed("ab");
        assert_eq!(short.visible_window(10), ("ab", 2));
    }

    #[test]
    fn test_render_shows_buffer() {
        let backend = TestBackend::new(30, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut input = typed("hello robot");

        terminal.draw(|f| input.render(f, f.area())).unwrap();

        let buffer = terminal.backend().buffer();
        let text = buffer.content().iter().map(|c| c.symbol()).collect::<String>();
        assert!(text.contains("Message"));
        assert!(text.contains("hello robot"));
    }
}
