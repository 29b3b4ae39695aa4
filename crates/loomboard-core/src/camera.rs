//! Camera: the mapping between screen pixels and page coordinates.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Pan and zoom of the canvas, plus the viewport size in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Screen position of the page origin.
    pub offset: Vec2,
    /// Screen pixels per page unit.
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Viewport size in screen pixels.
    pub viewport: Size,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
            viewport: Size::new(1280.0, 800.0),
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Page to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen to page transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_page(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn page_to_screen(&self, page_point: Point) -> Point {
        self.transform() * page_point
    }

    /// Convert a screen-pixel distance to page units at the current zoom.
    pub fn screen_distance(&self, pixels: f64) -> f64 {
        pixels / self.zoom
    }

    /// The part of the page currently visible.
    pub fn viewport_page_bounds(&self) -> Rect {
        Rect::from_points(
            self.screen_to_page(Point::ZERO),
            self.screen_to_page(Point::new(self.viewport.width, self.viewport.height)),
        )
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let page_point = self.screen_to_page(screen_point);
        self.zoom = new_zoom;
        self.offset += screen_point - self.page_to_screen(page_point);
    }
}
