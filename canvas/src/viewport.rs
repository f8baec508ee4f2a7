//! Viewport transform: scale/pan state, coordinate conversion, and auto-fit.
//!
//! The viewport maps canvas space (item coordinates) to screen space (CSS
//! pixels inside the board container): `screen = canvas * scale + pan`.
//! [`Viewport::to_canvas`] is the only place a screen delta is divided by the
//! scale; the interaction handlers never do that math themselves.
//!
//! Viewport state is transient. It is recomputed by [`Viewport::auto_fit`],
//! stepped by manual zoom, or shifted by drag-to-pan, and is never persisted
//! with the board.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::config::ViewportConfig;
use crate::geometry::{CanvasItem, Point, Rect, bounding_box};

/// Pixel size of the board container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Supplies the current pixel size of the board container.
pub trait ContainerMeasure {
    fn container_size(&self) -> Size;
}

impl ContainerMeasure for Size {
    fn container_size(&self) -> Size {
        *self
    }
}

/// Scale and pan of the board view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scale: 1.0, pan_x: 0.0, pan_y: 0.0 }
    }
}

impl Viewport {
    /// Convert a screen-space delta to a canvas-space delta.
    #[must_use]
    pub fn to_canvas(&self, screen_delta: Point) -> Point {
        Point::new(screen_delta.x / self.scale, screen_delta.y / self.scale)
    }

    /// Convert a screen-space point to canvas coordinates.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        self.to_canvas(Point::new(screen.x - self.pan_x, screen.y - self.pan_y))
    }

    /// Convert a canvas-space point to screen coordinates.
    #[must_use]
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point::new(canvas.x * self.scale + self.pan_x, canvas.y * self.scale + self.pan_y)
    }

    /// Map a canvas-space rectangle to the screen.
    #[must_use]
    pub fn canvas_rect_to_screen(&self, rect: Rect) -> Rect {
        let origin = self.canvas_to_screen(Point::new(rect.x, rect.y));
        Rect::new(origin.x, origin.y, rect.width * self.scale, rect.height * self.scale)
    }

    /// Frame all non-background items inside the container with padding.
    ///
    /// An empty item set, or a container that has not been laid out yet
    /// (non-positive size), resets to the configured fallback scale with zero
    /// pan.
    pub fn auto_fit<'a, I, M>(&mut self, items: I, container: &M, cfg: &ViewportConfig)
    where
        I: IntoIterator<Item = &'a CanvasItem>,
        M: ContainerMeasure + ?Sized,
    {
        let size = container.container_size();
        let content = bounding_box(items.into_iter().filter(|item| !item.is_background));

        let Some(content) = content.filter(|_| size.width > 0.0 && size.height > 0.0) else {
            self.reset_to(cfg.empty_fit_scale);
            tracing::debug!(scale = self.scale, "auto-fit fallback: nothing to frame");
            return;
        };

        let padding_x = size.width * cfg.fit_padding_ratio;
        let padding_y = size.height * cfg.fit_padding_ratio;
        let scale_x = (size.width - 2.0 * padding_x) / content.width;
        let scale_y = (size.height - 2.0 * padding_y) / content.height;
        let scale = scale_x.min(scale_y).min(cfg.fit_max_scale);

        let center = content.center();
        self.scale = scale;
        self.pan_x = size.width * 0.5 - center.x * scale;
        self.pan_y = size.height * 0.5 - center.y * scale;
        tracing::debug!(scale, pan_x = self.pan_x, pan_y = self.pan_y, "auto-fit");
    }

    /// Increase scale by one step, clamped to the configured range. Pan is unchanged.
    pub fn zoom_in(&mut self, cfg: &ViewportConfig) {
        self.set_scale(self.scale + cfg.zoom_step, cfg);
    }

    /// Decrease scale by one step, clamped to the configured range. Pan is unchanged.
    pub fn zoom_out(&mut self, cfg: &ViewportConfig) {
        self.set_scale(self.scale - cfg.zoom_step, cfg);
    }

    /// Shift the view by a screen-space delta.
    pub fn pan_by(&mut self, screen_delta: Point) {
        self.pan_x += screen_delta.x;
        self.pan_y += screen_delta.y;
    }

    fn set_scale(&mut self, scale: f64, cfg: &ViewportConfig) {
        self.scale = scale.clamp(cfg.min_scale, cfg.max_scale);
    }

    fn reset_to(&mut self, scale: f64) {
        self.scale = scale;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }
}
