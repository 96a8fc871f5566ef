use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// A piece of the screen that draws itself into a `Rect`.
///
/// Props are struct fields set by the parent. `render` takes `&mut self` so
/// stateful components can refresh layout caches and scroll offsets while
/// drawing, like ratatui's `StatefulWidget`.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that turns terminal events into its own higher-level events.
pub trait EventHandler {
    type Event;

    /// Returns `None` when the event was ignored or handled internally.
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
