use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::chat::{Author, MessageEntry};

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// A stateless component that renders one chat entry, styled by author.
///
/// - **user** (green): what was typed
/// - **bot** (blue): the canned reply
///
/// [`calculate_height`](Self::calculate_height) predicts the rendered height
/// with `textwrap` options matching ratatui's `Paragraph` wrapping, so the
/// parent `MessageList` can lay out the scroll view before drawing.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub entry: &'a MessageEntry,
}

impl<'a> Message<'a> {
    pub fn new(entry: &'a MessageEntry) -> Self {
        Self { entry }
    }

    pub fn calculate_height(entry: &MessageEntry, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Too narrow for borders + padding; still occupy a row
            return 1;
        }

        let content = entry.text.trim();
        if content.is_empty() {
            return VERTICAL_OVERHEAD;
        }

        let options = textwrap::Options::new(content_width as usize)
            .break_words(true)
            .word_separator(textwrap::WordSeparator::AsciiSpace);

        let lines = textwrap::wrap(content, options);
        (lines.len() as u16).max(1) + VERTICAL_OVERHEAD
    }
}

fn author_style(author: Author) -> Style {
    match author {
        Author::User => Style::default().fg(Color::Green),
        Author::Bot => Style::default().fg(Color::Blue),
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = author_style(self.entry.author);
        let border_style = style.add_modifier(Modifier::DIM);

        let block = Block::bordered()
            .title(self.entry.author.label())
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.entry.text.trim())
            .style(style)
            .wrap(Wrap { trim: true })
            .render(inner_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn calculate_height_empty_content_returns_border_height() {
        let entry = MessageEntry::user("");
        assert_eq!(Message::calculate_height(&entry, 80), VERTICAL_OVERHEAD);
    }

    #[test]
    fn calculate_height_zero_width_returns_minimum() {
        let entry = MessageEntry::user("Hello world");
        assert_eq!(Message::calculate_height(&entry, 0), 1);
        assert_eq!(Message::calculate_height(&entry, HORIZONTAL_OVERHEAD), 1);
    }

    #[test]
    fn calculate_height_wraps_at_width_boundary() {
        let entry = MessageEntry::user("Hello world");
        // width 9 → content_width 5: "Hello" | "world"
        assert_eq!(Message::calculate_height(&entry, 9), 2 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn calculate_height_breaks_long_words() {
        let entry = MessageEntry::bot("abcdefghij");
        // width 8 → content_width 4: "abcd" | "efgh" | "ij"
        assert_eq!(Message::calculate_height(&entry, 8), 3 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn style_by_author() {
        assert_eq!(author_style(Author::User).fg, Some(Color::Green));
        assert_eq!(author_style(Author::Bot).fg, Some(Color::Blue));
    }

    #[test]
    fn render_shows_author_and_text() {
        let backend = TestBackend::new(30, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let entry = MessageEntry::bot("beep boop");
        terminal
            .draw(|f| f.render_widget(Message::new(&entry), f.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text = buffer.content().iter().map(|c| c.symbol()).collect::<String>();
        assert!(text.contains("bot"));
        assert!(text.contains("beep boop"));
    }
}
