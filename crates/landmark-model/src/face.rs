//! Face detections and pixel-space face boxes.

use serde::{Deserialize, Serialize};

/// Bounding box relative to frame dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub xmin: f64,
    pub ymin: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedBox {
    pub fn new(xmin: f64, ymin: f64, width: f64, height: f64) -> Self {
        Self {
            xmin,
            ymin,
            width,
            height,
        }
    }
}

/// One face reported by the face detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    /// Normalized bounding box.
    pub bbox: NormalizedBox,

    /// Detector confidence in `[0, 1]`.
    #[serde(default = "default_score")]
    pub score: f32,
}

fn default_score() -> f32 {
    1.0
}

impl FaceDetection {
    pub fn new(bbox: NormalizedBox, score: f32) -> Self {
        Self { bbox, score }
    }
}

/// Axis-aligned face rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Project a normalized box into a frame, truncating toward zero.
    ///
    /// Boxes reaching past the frame are clipped to it first.
    pub fn from_normalized(bbox: &NormalizedBox, frame_width: u32, frame_height: u32) -> Self {
        let fw = frame_width as f64;
        let fh = frame_height as f64;
        let (xmin, width) = clip_span(bbox.xmin, bbox.width);
        let (ymin, height) = clip_span(bbox.ymin, bbox.height);
        Self {
            x: (xmin * fw) as i32,
            y: (ymin * fh) as i32,
            width: (width * fw) as i32,
            height: (height * fh) as i32,
        }
    }

    /// Area in square pixels (zero for degenerate boxes).
    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    /// Center point in pixels.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Whether a pixel-space point lies inside the box.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x as f64 && px < self.right() as f64 && py >= self.y as f64 && py < self.bottom() as f64
    }

    /// Intersection-over-union with another box.
    pub fn iou(&self, other: &FaceBox) -> f64 {
        let right = |b: &FaceBox| b.x as i64 + b.width as i64;
        let bottom = |b: &FaceBox| b.y as i64 + b.height as i64;
        let ix = (right(self).min(right(other)) - self.x.max(other.x) as i64).max(0);
        let iy = (bottom(self).min(bottom(other)) - self.y.max(other.y) as i64).max(0);
        let intersection = ix * iy;
        let union = self.area() + other.area() - intersection;
        if union <= 0 {
            return 0.0;
        }
        intersection as f64 / union as f64
    }

    /// Box height as a fraction of frame height.
    pub fn height_fraction(&self, frame_height: u32) -> f64 {
        if frame_height == 0 {
            return 0.0;
        }
        self.height as f64 / frame_height as f64
    }
}

/// Clip a normalized `[start, start + len)` span to `[0, 1]`.
fn clip_span(start: f64, len: f64) -> (f64, f64) {
    if start >= 0.0 && len >= 0.0 && start + len <= 1.0 {
        return (start, len);
    }
    let lo = start.clamp(0.0, 1.0);
    let hi = (start + len.max(0.0)).clamp(0.0, 1.0);
    (lo, (hi - lo).max(0.0))
}
