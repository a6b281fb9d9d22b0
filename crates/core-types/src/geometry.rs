//! Viewport geometry in CSS pixels.
//!
//! Coordinates follow the bounding-client-rect convention: the origin is the
//! top-left corner of the viewport, `top`/`left` may be negative for content
//! scrolled or positioned out of view.

/// A bounding rectangle relative to the viewport.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn has_positive_size(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Whether any part of the rectangle touches `[0, 0] x [width, height]`.
    /// Edges count as touching.
    pub fn intersects_viewport(&self, viewport: Size) -> bool {
        self.bottom() >= 0.0
            && self.right() >= 0.0
            && self.top <= viewport.height
            && self.left <= viewport.width
    }

    /// Area of the rectangle left after clipping against the viewport's right
    /// and bottom edges. Never negative.
    pub fn visible_area(&self, viewport: Size) -> f64 {
        let visible_width = self.width.min(viewport.width - self.left).max(0.0);
        let visible_height = self.height.min(viewport.height - self.top).max(0.0);
        visible_width * visible_height
    }
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

impl ScrollOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_scrolled(&self) -> bool {
        self.x > 0.0 || self.y > 0.0
    }
}
