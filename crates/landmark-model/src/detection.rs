//! Per-frame detection output and the detector seam.
//!
//! Detection scripts use JSONL: one [`Detections`] object per line, blank
//! lines and `#` comments ignored. Every field is optional:
//!
//! ```text
//! {"faces": [{"bbox": {"xmin": 0.3, "ymin": 0.2, "width": 0.3, "height": 0.4}}]}
//! {"hands": [[[0.5, 0.5], [0.5, 0.45], ...]]}
//! ```

use enhancer_common::error::EnhancerResult;
use serde::{Deserialize, Serialize};

use crate::face::FaceDetection;
use crate::frame::VideoFrame;
use crate::landmarks::{FaceMesh, HandLandmarks};

/// Everything the detection engine reported for one frame.
///
/// Empty vectors mean "nothing found", which is not an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Detections {
    /// Face-mesh landmark sets, one per face.
    pub face_meshes: Vec<FaceMesh>,

    /// Face bounding boxes, one per face.
    pub faces: Vec<FaceDetection>,

    /// Hand landmark sets, one per hand.
    pub hands: Vec<HandLandmarks>,
}

impl Detections {
    /// True when nothing at all was detected.
    pub fn is_empty(&self) -> bool {
        self.face_meshes.is_empty() && self.faces.is_empty() && self.hands.is_empty()
    }
}

/// Trait for landmark detection backends.
pub trait LandmarkDetector: Send {
    /// Run face-mesh, face, and hand detection on one frame.
    fn detect(&mut self, frame: &VideoFrame) -> EnhancerResult<Detections>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Parse a detection script from JSONL content.
pub fn parse_detections(jsonl: &str) -> Result<Vec<Detections>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}
