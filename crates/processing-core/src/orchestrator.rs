//! Per-frame control loop.
//!
//! The orchestrator owns every piece of tracking state and runs one frame
//! through feature extraction, talking smoothing, speaker selection, zoom,
//! volume, and annotation, in that order, producing an immutable
//! [`FramePacket`] for presentation.

use std::fmt;

use enhancer_common::config::AppConfig;
use enhancer_landmark_model::detection::Detections;
use enhancer_landmark_model::face::FaceBox;
use enhancer_landmark_model::frame::VideoFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::features::{FeatureConfig, FeatureExtractor};
use crate::overlay;
use crate::speaker::{ActiveSpeakerSelector, SpeakerConfig};
use crate::talking::TalkingSmoother;
use crate::volume::{AudioSink, NullAudioSink, VolumeConfig, VolumeController};
use crate::zoom::{ZoomConfig, ZoomController, ZoomDirection};

/// Configuration for the whole control loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub features: FeatureConfig,
    pub history_size: usize,
    pub speaker: SpeakerConfig,
    pub zoom: ZoomConfig,
    pub volume: VolumeConfig,
    /// Draw landmark overlays on outgoing frames.
    pub annotate: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            features: FeatureConfig::default(),
            history_size: 5,
            speaker: SpeakerConfig::default(),
            zoom: ZoomConfig::default(),
            volume: VolumeConfig::default(),
            annotate: true,
        }
    }
}

impl PipelineConfig {
    /// Build from the application configuration file.
    pub fn from_app_config(config: &AppConfig) -> Self {
        let t = &config.tracking;
        Self {
            features: FeatureConfig {
                mouth_open_threshold: t.mouth_open_threshold,
                fist_policy: t.fist_policy,
            },
            history_size: t.mouth_history_size,
            speaker: SpeakerConfig {
                cooldown_secs: t.zoom_cooldown_secs,
                switch_after_frames: t.speaker_switch_frames,
                match_iou: t.match_iou,
            },
            zoom: ZoomConfig {
                min_zoom: t.min_zoom,
                max_zoom: t.max_zoom,
                zoom_speed: t.zoom_speed,
                distance_threshold_lo: t.distance_threshold_lo,
                distance_threshold_hi: t.distance_threshold_hi,
            },
            volume: VolumeConfig {
                default_volume: config.audio.default_volume,
                low_volume: config.audio.low_volume,
            },
            annotate: t.annotate,
        }
    }
}

/// All state that persists across frames within a tracking session.
#[derive(Debug)]
pub struct TrackingState {
    pub smoother: TalkingSmoother,
    pub selector: ActiveSpeakerSelector,
    pub zoom: ZoomController,
    pub volume: VolumeController,
}

impl TrackingState {
    pub fn new(config: &PipelineConfig, sink: Box<dyn AudioSink>) -> Self {
        Self {
            smoother: TalkingSmoother::new(config.history_size),
            selector: ActiveSpeakerSelector::new(config.speaker.clone()),
            zoom: ZoomController::new(config.zoom.clone()),
            volume: VolumeController::new(config.volume.clone(), sink),
        }
    }

    /// Back to the start-of-session state: minimum zoom, default volume,
    /// empty history, no target. Playback is left as it is.
    pub fn reset(&mut self) {
        self.smoother.clear();
        self.selector.reset();
        self.zoom.reset();
        self.volume.reset();
    }
}

/// Status reported alongside every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameStatus {
    pub sequence: u64,
    pub timestamp_ns: u64,
    pub face_count: usize,
    pub talking: bool,
    pub zoom: f64,
    pub zoom_direction: ZoomDirection,
    pub fist: bool,
    pub volume: f32,
    pub tracking: bool,
    pub active_speaker: Option<FaceBox>,
}

impl FrameStatus {
    /// Volume as a whole percentage.
    pub fn volume_percent(&self) -> u32 {
        (self.volume * 100.0).round().max(0.0) as u32
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

impl fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Faces: {} | Talking: {} | Zoom: {:.1}x | Fist: {} | Volume: {}%",
            self.face_count,
            yes_no(self.talking),
            self.zoom,
            yes_no(self.fist),
            self.volume_percent()
        )
    }
}

/// One finished frame handed to presentation.
#[derive(Debug, Clone)]
pub struct FramePacket {
    /// Annotated and zoomed frame.
    pub frame: VideoFrame,
    /// Face boxes found in this frame.
    pub faces: Vec<FaceBox>,
    pub status: FrameStatus,
}

/// Runs the control loop one frame at a time.
pub struct FrameOrchestrator {
    config: PipelineConfig,
    extractor: FeatureExtractor,
    state: TrackingState,
    tracking: bool,
}

impl FrameOrchestrator {
    pub fn new(config: PipelineConfig, sink: Box<dyn AudioSink>) -> Self {
        let extractor = FeatureExtractor::new(config.features.clone());
        let state = TrackingState::new(&config, sink);
        Self {
            config,
            extractor,
            state,
            tracking: false,
        }
    }

    /// Orchestrator with default configuration and no audio output.
    pub fn with_defaults() -> Self {
        Self::new(PipelineConfig::default(), Box::new(NullAudioSink))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> &TrackingState {
        &self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Enable or disable tracking.
    ///
    /// Enabling resets the session state and starts the music on the first
    /// call. Disabling restores the default volume.
    pub fn set_tracking(&mut self, enabled: bool) {
        if enabled == self.tracking {
            return;
        }
        self.tracking = enabled;
        if enabled {
            info!("Tracking started");
            self.state.reset();
            self.state.volume.start_playback();
        } else {
            info!("Tracking stopped");
            self.state.volume.reset();
        }
    }

    /// Stop music playback at the end of a session.
    pub fn shutdown(&mut self) {
        self.tracking = false;
        self.state.volume.stop_playback();
    }

    /// Run one frame through the loop.
    pub fn process(&mut self, frame: VideoFrame, detections: &Detections) -> FramePacket {
        if !self.tracking {
            return self.passthrough(frame);
        }

        let (width, height) = (frame.width(), frame.height());
        let features = self.extractor.extract(detections, width, height);

        // Faceless frames push `false` so talking decays after a full history.
        let talking = self.state.smoother.push(features.any_mouth_open());
        let target = self
            .state
            .selector
            .update(&features.faces, talking, frame.timestamp_secs());
        let zoom = self.state.zoom.update(target.as_ref(), height);

        let fist = features.fist(self.config.features.fist_policy);
        if let Some(is_fist) = fist {
            self.state.volume.set_fist_state(is_fist);
        }

        let faces = features.face_boxes();
        let annotated = if self.config.annotate {
            let mut image = frame.image.clone();
            overlay::annotate(&mut image, detections, &faces, target.as_ref());
            frame.with_image(image)
        } else {
            frame
        };
        let output = self.state.zoom.apply(&annotated, target.as_ref());

        let status = FrameStatus {
            sequence: output.sequence,
            timestamp_ns: output.timestamp_ns,
            face_count: faces.len(),
            talking,
            zoom,
            zoom_direction: self.state.zoom.direction(),
            fist: fist.unwrap_or(false),
            volume: self.state.volume.level(),
            tracking: true,
            active_speaker: target,
        };
        debug!(
            sequence = status.sequence,
            faces = status.face_count,
            talking,
            zoom,
            fist = status.fist,
            "Frame processed"
        );

        FramePacket {
            frame: output,
            faces,
            status,
        }
    }

    /// Package a frame untouched, reporting no detections.
    pub fn passthrough(&self, frame: VideoFrame) -> FramePacket {
        let status = FrameStatus {
            sequence: frame.sequence,
            timestamp_ns: frame.timestamp_ns,
            face_count: 0,
            talking: false,
            zoom: 1.0,
            zoom_direction: ZoomDirection::Hold,
            fist: false,
            volume: self.state.volume.level(),
            tracking: false,
            active_speaker: None,
        };
        FramePacket {
            frame,
            faces: Vec::new(),
            status,
        }
    }
}

impl fmt::Debug for FrameOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameOrchestrator")
            .field("tracking", &self.tracking)
            .field("state", &self.state)
            .finish()
    }
}
