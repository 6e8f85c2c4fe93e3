//! Simulated camera zoom.
//!
//! The zoom factor ramps toward a face that is far from the camera and back
//! out when the face is close or gone, moving at most `zoom_speed` per
//! frame. Applying the zoom crops a `1 / zoom` window around the target and
//! scales it back to the full frame size.

use std::fmt;

use enhancer_landmark_model::face::FaceBox;
use enhancer_landmark_model::frame::VideoFrame;
use enhancer_landmark_model::viewport::Viewport;
use serde::{Deserialize, Serialize};

/// Float drift below which the zoom snaps onto a bound.
const SNAP_EPSILON: f64 = 1e-12;

/// Configuration for the zoom controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,

    /// Maximum zoom change per frame.
    pub zoom_speed: f64,

    /// Face height fraction below which the zoom ramps in.
    pub distance_threshold_lo: f64,

    /// Face height fraction above which the zoom ramps out.
    pub distance_threshold_hi: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_zoom: 1.0,
            max_zoom: 2.0,
            zoom_speed: 0.05,
            distance_threshold_lo: 0.1,
            distance_threshold_hi: 0.3,
        }
    }
}

/// Direction of the last zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomDirection {
    In,
    Out,
    #[default]
    Hold,
}

impl fmt::Display for ZoomDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoomDirection::In => write!(f, "in"),
            ZoomDirection::Out => write!(f, "out"),
            ZoomDirection::Hold => write!(f, "hold"),
        }
    }
}

/// Rate-limited zoom state.
#[derive(Debug, Clone)]
pub struct ZoomController {
    config: ZoomConfig,
    zoom: f64,
    direction: ZoomDirection,
}

impl ZoomController {
    pub fn new(config: ZoomConfig) -> Self {
        let zoom = config.min_zoom;
        Self {
            config,
            zoom,
            direction: ZoomDirection::Hold,
        }
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn direction(&self) -> ZoomDirection {
        self.direction
    }

    /// Jump to a zoom factor, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
    }

    pub fn reset(&mut self) {
        self.zoom = self.config.min_zoom;
        self.direction = ZoomDirection::Hold;
    }

    /// Advance one frame given the target's closeness (face height over
    /// frame height), or `None` when there is no target.
    pub fn step(&mut self, closeness: Option<f64>) -> f64 {
        let cfg = &self.config;
        self.direction = match closeness {
            Some(metric) if metric < cfg.distance_threshold_lo => {
                self.zoom = (self.zoom + cfg.zoom_speed).min(cfg.max_zoom);
                ZoomDirection::In
            }
            Some(metric) if metric <= cfg.distance_threshold_hi => ZoomDirection::Hold,
            _ => {
                self.zoom = (self.zoom - cfg.zoom_speed).max(cfg.min_zoom);
                ZoomDirection::Out
            }
        };
        if (self.zoom - cfg.min_zoom).abs() < SNAP_EPSILON {
            self.zoom = cfg.min_zoom;
        } else if (cfg.max_zoom - self.zoom).abs() < SNAP_EPSILON {
            self.zoom = cfg.max_zoom;
        }
        self.zoom
    }

    /// Advance one frame toward `target` in a frame `frame_height` pixels tall.
    pub fn update(&mut self, target: Option<&FaceBox>, frame_height: u32) -> f64 {
        self.step(target.map(|face| face.height_fraction(frame_height)))
    }

    /// Crop window for the current zoom, centred on the target (or the
    /// frame centre) and shifted to stay inside the frame.
    pub fn viewport(&self, target: Option<&FaceBox>, width: u32, height: u32) -> Viewport {
        let (cx, cy) = match target {
            Some(face) if width > 0 && height > 0 => {
                let (x, y) = face.center();
                (x / width as f64, y / height as f64)
            }
            _ => (0.5, 0.5),
        };
        Viewport::for_zoom(cx, cy, self.zoom)
    }

    /// Apply the current zoom to a frame. Zoom 1.0 returns the input unchanged.
    pub fn apply(&self, frame: &VideoFrame, target: Option<&FaceBox>) -> VideoFrame {
        if self.zoom <= 1.0 {
            return frame.clone();
        }
        frame.crop_and_scale(&self.viewport(target, frame.width(), frame.height()))
    }
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use proptest::prelude::*;

    #[test]
    fn test_far_face_zooms_in() {
        let mut zoom = ZoomController::default();
        let far = FaceBox::new(300, 200, 40, 40);
        assert!((zoom.update(Some(&far), 480) - 1.05).abs() < 1e-9);
        assert_eq!(zoom.direction(), ZoomDirection::In);
    }

    #[test]
    fn test_mid_distance_holds() {
        let mut zoom = ZoomController::default();
        zoom.set_zoom(1.5);
        let mid = FaceBox::new(200, 100, 100, 100);
        assert_eq!(zoom.update(Some(&mid), 480), 1.5);
        assert_eq!(zoom.direction(), ZoomDirection::Hold);
    }

    #[test]
    fn test_close_face_or_no_target_zooms_out() {
        let mut zoom = ZoomController::default();
        zoom.set_zoom(1.5);
        let close = FaceBox::new(100, 0, 300, 300);
        assert!((zoom.update(Some(&close), 480) - 1.45).abs() < 1e-9);
        assert_eq!(zoom.direction(), ZoomDirection::Out);

        assert!((zoom.update(None, 480) - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_at_bounds() {
        let mut zoom = ZoomController::default();
        zoom.update(None, 480);
        assert_eq!(zoom.zoom(), 1.0);

        zoom.set_zoom(1.98);
        zoom.step(Some(0.05));
        assert_eq!(zoom.zoom(), 2.0);
    }

    #[test]
    fn test_identity_at_unit_zoom() {
        let zoom = ZoomController::default();
        let image = RgbImage::from_fn(32, 24, |x, y| Rgb([x as u8, y as u8, 7]));
        let frame = VideoFrame::new(image, 0, 0);
        let target = FaceBox::new(0, 0, 4, 4);
        assert_eq!(zoom.apply(&frame, Some(&target)), frame);
    }

    #[test]
    fn test_viewport_shifts_at_edges() {
        let mut zoom = ZoomController::default();
        zoom.set_zoom(2.0);
        let corner = FaceBox::new(600, 440, 40, 40);
        let vp = zoom.viewport(Some(&corner), 640, 480);
        assert!((vp.right() - 1.0).abs() < 1e-12);
        assert!((vp.bottom() - 1.0).abs() < 1e-12);
        assert!((vp.w - 0.5).abs() < 1e-12);

        assert_eq!(zoom.viewport(None, 640, 480).center(), (0.5, 0.5));
    }

    #[test]
    fn test_apply_keeps_frame_size() {
        let mut zoom = ZoomController::default();
        zoom.set_zoom(1.6);
        let frame = VideoFrame::new(RgbImage::new(64, 48), 5, 9);
        let out = zoom.apply(&frame, Some(&FaceBox::new(10, 10, 8, 8)));
        assert_eq!((out.width(), out.height()), (64, 48));
        assert_eq!((out.timestamp_ns, out.sequence), (5, 9));
    }

    proptest! {
        #[test]
        fn prop_zoom_bounded_and_rate_limited(
            metrics in proptest::collection::vec(proptest::option::of(0.0f64..1.0), 1..200),
        ) {
            let mut zoom = ZoomController::default();
            let mut previous = zoom.zoom();
            for metric in metrics {
                let current = zoom.step(metric);
                prop_assert!((1.0..=2.0).contains(&current));
                prop_assert!((current - previous).abs() <= 0.05 + 1e-9);
                previous = current;
            }
        }

        #[test]
        fn prop_reaches_min_without_target(initial in 1.0f64..=2.0) {
            let mut zoom = ZoomController::default();
            zoom.set_zoom(initial);
            let frames = ((initial - 1.0) / 0.05).ceil() as usize;
            for _ in 0..frames {
                zoom.update(None, 480);
            }
            prop_assert_eq!(zoom.zoom(), 1.0);
        }
    }
}
