//! Call Enhancer Processing Core
//!
//! Turns per-frame landmark detections into reactive effects:
//! - **Features:** Lip gap, fist classification, and face boxes per frame
//! - **Talking:** Debounced talking state over a short sample history
//! - **Speaker:** Active speaker selection with hysteresis
//! - **Zoom:** Rate-limited zoom toward the speaker, applied as crop + rescale
//! - **Volume:** Fist-driven music volume presets
//! - **Orchestrator:** The per-frame loop tying it all together
//!
//! This crate is pure computation apart from the `AudioSink` seam.
//! All inputs are data; all outputs are data.

pub mod features;
pub mod orchestrator;
pub mod overlay;
pub mod shape;
pub mod speaker;
pub mod talking;
pub mod volume;
pub mod zoom;

pub use features::FeatureExtractor;
pub use orchestrator::{FrameOrchestrator, FramePacket, FrameStatus, PipelineConfig};
pub use shape::RotatableShape;
pub use speaker::ActiveSpeakerSelector;
pub use talking::TalkingSmoother;
pub use volume::{AudioSink, NullAudioSink, VolumeController};
pub use zoom::{ZoomController, ZoomDirection};
