//! # AvatarCanvas Component
//!
//! The avatar's drawing surface in terminal form.
//!
//! [`CellSurface`] is a grid of characters implementing
//! [`DrawingSurface`]; the render loop clears it and stamps the media's
//! current frame onto it each tick. [`AvatarCanvas`] then copies the grid into
//! the ratatui buffer, clipped to the area it was given.
//!
//! ```text
//! ClipPlayer ──current_frame──▶ render_frame() ──▶ CellSurface ──▶ AvatarCanvas ──▶ Buffer
//! ```

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

use crate::core::media::Frame;
use crate::core::surface::{DrawingSurface, SurfaceSize};

/// Character raster sized in terminal cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSurface {
    size: SurfaceSize,
    cells: Vec<char>,
}

impl CellSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            cells: vec![' '; size.width as usize * size.height as usize],
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Character at (`x`, `y`); a space outside the surface.
    pub fn cell(&self, x: u16, y: u16) -> char {
        self.index(x, y)
            .and_then(|i| self.cells.get(i))
            .copied()
            .unwrap_or(' ')
    }

    /// One surface row as a string, for tests and debugging.
    pub fn row(&self, y: u16) -> String {
        (0..self.size.width).map(|x| self.cell(x, y)).collect()
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.size.width && y < self.size.height)
            .then(|| y as usize * self.size.width as usize + x as usize)
    }

    fn set(&mut self, x: u16, y: u16, c: char) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = c;
        }
    }
}

impl DrawingSurface for CellSurface {
    fn width(&self) -> u16 {
        self.size.width
    }

    fn height(&self) -> u16 {
        self.size.height
    }

    fn resize(&mut self, size: SurfaceSize) {
        if size != self.size {
            *self = CellSurface::new(size);
        }
    }

    fn clear_rect(&mut self, x: u16, y: u16, width: u16, height: u16) {
        for row in y..y.saturating_add(height).min(self.size.height) {
            for col in x..x.saturating_add(width).min(self.size.width) {
                self.set(col, row, ' ');
            }
        }
    }

    fn draw_image(&mut self, frame: &Frame, x: u16, y: u16, width: u16, height: u16) {
        for dy in 0..height {
            for dx in 0..width {
                let c = frame.sample(dx, dy, width, height);
                self.set(x.saturating_add(dx), y.saturating_add(dy), c);
            }
        }
    }
}

/// Widget that blits a [`CellSurface`] into the buffer.
pub struct AvatarCanvas<'a> {
    surface: &'a CellSurface,
    style: Style,
}

impl<'a> AvatarCanvas<'a> {
    pub fn new(surface: &'a CellSurface) -> Self {
        Self {
            surface,
            style: Style::default().fg(Color::LightCyan),
        }
    }
}

impl<'a> Widget for AvatarCanvas<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width.min(self.surface.width());
        let height = area.height.min(self.surface.height());
        for y in 0..height {
            for x in 0..width {
                if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                    cell.set_char(self.surface.cell(x, y)).set_style(self.style);
                }
            }
        }
    }
}
