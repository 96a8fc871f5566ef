//! # Stage and Render Loop
//!
//! Sizing of the avatar's drawing surface and the per-frame copy from the
//! media source onto it.
//!
//! ## Resize policy
//!
//! ```text
//! viewport height H > max   →  surface height = max, width unchanged
//! viewport height H <= max  →  surface = H x H (square)
//! ```
//!
//! The square fallback ignores the previous aspect ratio. The chat panel gets
//! whatever width the surface leaves over; that width is computed once at
//! startup unless the stage is configured to follow resizes.

use std::time::Instant;

use log::debug;

use crate::core::media::{Frame, MediaSource};

/// Tallest the surface may get, in viewport units.
pub const MAX_SURFACE_HEIGHT: u16 = 720;
/// Surface width before any square fit, in viewport units.
pub const DEFAULT_SURFACE_WIDTH: u16 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u16,
    pub height: u16,
}

impl SurfaceSize {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Applies the resize policy to `current`.
pub fn fit_surface(viewport: Viewport, current: SurfaceSize, max_height: u16) -> SurfaceSize {
    if viewport.height > max_height {
        SurfaceSize {
            width: current.width,
            height: max_height,
        }
    } else {
        SurfaceSize {
            width: viewport.height,
            height: viewport.height,
        }
    }
}

/// Width left for the chat panel beside the surface.
pub fn panel_max_width(viewport: Viewport, surface: SurfaceSize) -> u16 {
    viewport.width.saturating_sub(surface.width)
}

/// Layout of the page: viewport, avatar surface and chat panel width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    viewport: Viewport,
    surface: SurfaceSize,
    panel_max_width: u16,
    max_surface_height: u16,
    recompute_panel_width: bool,
}

impl Stage {
    pub fn new(
        viewport: Viewport,
        initial_width: u16,
        max_surface_height: u16,
        recompute_panel_width: bool,
    ) -> Self {
        let surface = fit_surface(
            viewport,
            SurfaceSize::new(initial_width, 0),
            max_surface_height,
        );
        Self {
            viewport,
            surface,
            panel_max_width: panel_max_width(viewport, surface),
            max_surface_height,
            recompute_panel_width,
        }
    }

    /// Re-run the surface sizing. The panel width follows only when the
    /// stage was built with `recompute_panel_width`.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.surface = fit_surface(viewport, self.surface, self.max_surface_height);
        if self.recompute_panel_width {
            self.panel_max_width = panel_max_width(viewport, self.surface);
        }
        debug!(
            "Stage resized: viewport {}x{}, surface {}x{}, panel {}",
            viewport.width,
            viewport.height,
            self.surface.width,
            self.surface.height,
            self.panel_max_width
        );
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn panel_max_width(&self) -> u16 {
        self.panel_max_width
    }

    pub fn recomputes_panel_width(&self) -> bool {
        self.recompute_panel_width
    }
}

/// Host capability: a 2D raster the avatar is drawn onto.
pub trait DrawingSurface {
    fn width(&self) -> u16;
    fn height(&self) -> u16;
    fn resize(&mut self, size: SurfaceSize);
    fn clear_rect(&mut self, x: u16, y: u16, width: u16, height: u16);
    /// Draw `frame` stretched to the given rectangle.
    fn draw_image(&mut self, frame: &Frame, x: u16, y: u16, width: u16, height: u16);
}

/// One render-loop iteration: clear the surface, then copy the media's
/// current frame scaled to the surface's stored size.
///
/// Returns false when the media had no frame to present; the surface is left
/// blank in that case.
pub fn render_frame(surface: &mut dyn DrawingSurface, media: &dyn MediaSource, now: Instant) -> bool {
    let (width, height) = (surface.width(), surface.height());
    surface.clear_rect(0, 0, width, height);
    match media.current_frame(now) {
        Some(frame) => {
            surface.draw_image(frame, 0, 0, width, height);
            true
        }
        None => false,
    }
}
