//! Detector that replays recorded detections from a JSONL script.

use std::path::Path;

use enhancer_common::error::{EnhancerError, EnhancerResult};
use enhancer_landmark_model::detection::{parse_detections, Detections, LandmarkDetector};
use enhancer_landmark_model::frame::VideoFrame;
use tracing::info;

/// Replays one scripted [`Detections`] entry per frame sequence number.
/// Frames past the end of the script see no detections.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDetector {
    frames: Vec<Detections>,
}

impl ScriptedDetector {
    pub fn new(frames: Vec<Detections>) -> Self {
        Self { frames }
    }

    /// Load a JSONL script from disk.
    pub fn from_path(path: &Path) -> EnhancerResult<Self> {
        if !path.exists() {
            return Err(EnhancerError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let detector = Self::from_jsonl(&content)?;
        info!(
            path = %path.display(),
            frames = detector.len(),
            "Loaded detection script"
        );
        Ok(detector)
    }

    /// Parse a JSONL script.
    pub fn from_jsonl(content: &str) -> EnhancerResult<Self> {
        Ok(Self::new(parse_detections(content)?))
    }

    /// Number of scripted frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LandmarkDetector for ScriptedDetector {
    fn detect(&mut self, frame: &VideoFrame) -> EnhancerResult<Detections> {
        Ok(usize::try_from(frame.sequence)
            .ok()
            .and_then(|idx| self.frames.get(idx))
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
