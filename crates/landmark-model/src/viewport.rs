//! Viewport and region types for camera framing.
//!
//! Viewport coordinates are normalized to `[0.0, 1.0]` range.

use serde::{Deserialize, Serialize};

/// A rectangular viewport within the frame.
///
/// Coordinates are normalized: `(0.0, 0.0)` is top-left,
/// `(1.0, 1.0)` is bottom-right of the full frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge (normalized).
    pub x: f64,
    /// Top edge (normalized).
    pub y: f64,
    /// Width (normalized).
    pub w: f64,
    /// Height (normalized).
    pub h: f64,
}

impl Viewport {
    /// Full-frame viewport (no zoom).
    pub const FULL: Viewport = Viewport {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    /// Create a viewport centered at `(cx, cy)` with given dimensions.
    /// Shifts the window so it stays within [0, 1] bounds.
    pub fn centered(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        let w = w.clamp(0.01, 1.0);
        let h = h.clamp(0.01, 1.0);

        let x = (cx - w / 2.0).clamp(0.0, 1.0 - w);
        let y = (cy - h / 2.0).clamp(0.0, 1.0 - h);

        Self { x, y, w, h }
    }

    /// Viewport showing `1 / zoom` of the frame around `(cx, cy)`.
    pub fn for_zoom(cx: f64, cy: f64, zoom: f64) -> Self {
        let size = 1.0 / zoom.max(1.0);
        Self::centered(cx, cy, size, size)
    }

    /// The center point of this viewport.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        (self.x + self.w).min(1.0)
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        (self.y + self.h).min(1.0)
    }

    /// Convert to a pixel rectangle inside a `width` x `height` frame.
    ///
    /// The rectangle is at least one pixel in each dimension and never
    /// extends past the frame edges.
    pub fn to_pixels(&self, width: u32, height: u32) -> PixelRect {
        let rw = ((self.w * width as f64).round() as u32).clamp(1, width.max(1));
        let rh = ((self.h * height as f64).round() as u32).clamp(1, height.max(1));
        let rx = ((self.x * width as f64).round() as u32).min(width.saturating_sub(rw));
        let ry = ((self.y * height as f64).round() as u32).min(height.saturating_sub(rh));
        PixelRect::new(rx, ry, rw, rh)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::FULL
    }
}

/// An integer crop rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle covers a whole `width` x `height` frame.
    pub fn is_full(&self, width: u32, height: u32) -> bool {
        self.x == 0 && self.y == 0 && self.width == width && self.height == height
    }
}

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_viewport() {
        let vp = Viewport::FULL;
        assert_eq!((vp.x, vp.y, vp.w, vp.h), (0.0, 0.0, 1.0, 1.0));
        assert_eq!((vp.right(), vp.bottom()), (1.0, 1.0));
        assert_eq!(vp.center(), (0.5, 0.5));
    }

    #[test]
    fn test_centered_viewport_clamps() {
        // Centered near edge should shift, not shrink
        let vp = Viewport::centered(0.1, 0.1, 0.5, 0.5);
        assert_eq!((vp.x, vp.y), (0.0, 0.0));
        assert!((vp.w - 0.5).abs() < 1e-12);

        let vp = Viewport::centered(0.95, 0.9, 0.5, 0.5);
        assert!((vp.right() - 1.0).abs() < 1e-12);
        assert!((vp.bottom() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_for_zoom() {
        let vp = Viewport::for_zoom(0.5, 0.5, 2.0);
        assert!((vp.w - 0.5).abs() < 1e-9);
        assert!((vp.h - 0.5).abs() < 1e-9);
        assert_eq!(vp.center(), (0.5, 0.5));

        assert_eq!(Viewport::for_zoom(0.2, 0.8, 1.0), Viewport::FULL);
    }

    #[test]
    fn test_to_pixels_stays_inside_frame() {
        let rect = Viewport::for_zoom(1.0, 1.0, 1.5).to_pixels(640, 480);
        assert!(rect.x + rect.width <= 640);
        assert!(rect.y + rect.height <= 480);
        assert_eq!(rect.width, 427);
        assert_eq!(rect.height, 320);

        assert!(Viewport::FULL.to_pixels(640, 480).is_full(640, 480));
    }

    #[test]
    fn test_point2d_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);
    }
}
