//! Procedural frames and detections for demos and tests.
//!
//! [`SyntheticSource`] renders a moving test pattern. [`SyntheticScene`]
//! plays the part of the detection engine: a row of faces taking turns to
//! talk and one hand that periodically closes into a fist. Both are driven
//! by the frame sequence number, so runs are fully deterministic.

use enhancer_common::clock::SessionClock;
use enhancer_common::error::EnhancerResult;
use enhancer_landmark_model::detection::{Detections, LandmarkDetector};
use enhancer_landmark_model::face::{FaceDetection, NormalizedBox};
use enhancer_landmark_model::frame::VideoFrame;
use enhancer_landmark_model::landmarks::{FaceMesh, HandLandmarks, Landmark};
use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

use crate::source::FrameSource;

/// Renders a moving test pattern at a fixed size.
#[derive(Debug)]
pub struct SyntheticSource {
    width: u32,
    height: u32,
    frame_interval_ns: u64,
    frame_limit: Option<u64>,
    next_sequence: u64,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            frame_interval_ns: SessionClock::frame_interval_ns(fps),
            frame_limit: None,
            next_sequence: 0,
        }
    }

    /// Stop after `limit` frames.
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    fn render(&self, sequence: u64) -> RgbImage {
        let (w, h) = (self.width, self.height);
        let mut img: RgbImage = ImageBuffer::from_fn(w, h, |x, y| {
            let shade = (40 + (y * 40 / h.max(1))) as u8;
            Rgb([shade, shade, 50 + (x * 30 / w.max(1)) as u8])
        });

        let marker = 10.min(w / 8).max(1) as i32;
        let corners = [
            (marker + 4, marker + 4),
            (w as i32 - marker - 4, marker + 4),
            (w as i32 - marker - 4, h as i32 - marker - 4),
            (marker + 4, h as i32 - marker - 4),
        ];
        for center in corners {
            draw_filled_circle_mut(&mut img, center, marker, Rgb([255, 50, 50]));
        }

        // Sweeping bar so consecutive frames differ.
        let bar_w = (w / 20).max(1);
        let span = w.saturating_sub(bar_w).max(1) as u64;
        let bar_x = (sequence * 4 % span) as i32;
        draw_filled_rect_mut(
            &mut img,
            Rect::at(bar_x, (h - h / 12) as i32).of_size(bar_w, (h / 12).max(1)),
            Rgb([50, 200, 255]),
        );

        img
    }
}

impl FrameSource for SyntheticSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_frame(&mut self) -> Option<VideoFrame> {
        if self
            .frame_limit
            .map(|limit| self.next_sequence >= limit)
            .unwrap_or(false)
        {
            return None;
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        Some(VideoFrame::new(
            self.render(sequence),
            sequence * self.frame_interval_ns,
            sequence,
        ))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

/// Timing of the procedural scene, in frames.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Number of faces (at least one).
    pub faces: usize,
    /// Frames each face spends talking before the next takes over.
    pub turn_frames: u64,
    /// Length of one hand cycle.
    pub fist_period: u64,
    /// Frames at the end of each cycle during which the hand is a fist.
    pub fist_frames: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            faces: 2,
            turn_frames: 90,
            fist_period: 150,
            fist_frames: 45,
        }
    }
}

/// Procedural stand-in for the detection engine.
#[derive(Debug, Clone, Default)]
pub struct SyntheticScene {
    config: SceneConfig,
}

impl SyntheticScene {
    pub fn new(config: SceneConfig) -> Self {
        Self { config }
    }

    /// Index of the face talking at `sequence`.
    pub fn speaker_at(&self, sequence: u64) -> usize {
        let faces = self.config.faces.max(1) as u64;
        ((sequence / self.config.turn_frames.max(1)) % faces) as usize
    }

    /// Whether the hand is a fist at `sequence`.
    pub fn fist_at(&self, sequence: u64) -> bool {
        let period = self.config.fist_period.max(1);
        sequence % period >= period.saturating_sub(self.config.fist_frames)
    }

    /// Normalized box of face `index`. The first face sits far from the
    /// camera, the others closer.
    pub fn face_box(&self, index: usize) -> NormalizedBox {
        let faces = self.config.faces.max(1);
        let cx = (index + 1) as f64 / (faces + 1) as f64;
        let size = if index == 0 { 0.08 } else { 0.2 };
        NormalizedBox::new(cx - size / 2.0, 0.4 - size / 2.0, size, size)
    }

    /// Detections for one frame sequence number.
    pub fn detections_at(&self, sequence: u64) -> Detections {
        let speaker = self.speaker_at(sequence);
        let mut detections = Detections::default();

        for index in 0..self.config.faces.max(1) {
            let bbox = self.face_box(index);
            let mouth_center = Landmark::new(
                bbox.xmin + bbox.width / 2.0,
                bbox.ymin + bbox.height * 0.75,
            );
            let talking = index == speaker && sequence % 4 < 2;
            let opening = if talking { bbox.height * 0.3 } else { 0.0 };

            detections.face_meshes.push(FaceMesh::with_mouth(
                mouth_center,
                bbox.width * 0.4,
                opening,
            ));
            detections.faces.push(FaceDetection::new(bbox, 0.95));
        }

        detections.hands.push(HandLandmarks::posed(
            Landmark::new(0.85, 0.95),
            0.25,
            self.fist_at(sequence),
        ));

        detections
    }
}

impl LandmarkDetector for SyntheticScene {
    fn detect(&mut self, frame: &VideoFrame) -> EnhancerResult<Detections> {
        Ok(self.detections_at(frame.sequence))
    }

    fn name(&self) -> &str {
        "synthetic-scene"
    }
}
