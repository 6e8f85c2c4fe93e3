//! Call Enhancer Capture Engine
//!
//! Connects the control loop to the outside world: frame sources, landmark
//! detectors, audio sinks, and the background worker that ties them together.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │              enhancer-capture worker           │
//! │  ┌─────────────┐ ┌──────────┐ ┌─────────────┐ │
//! │  │ FrameSource │→│ Detector │→│ Orchestrator│ │
//! │  └─────────────┘ └──────────┘ └──────┬──────┘ │
//! └──────────────────────────────────────┼────────┘
//!                                        │ FramePacket (bounded channel)
//!                                        ▼
//!                          SessionHandle (CLI / desktop UI)
//! ```

pub mod audio;
pub mod scripted;
pub mod session;
pub mod source;
pub mod synthetic;

pub use audio::{open_music, MusicTrack};
pub use scripted::ScriptedDetector;
pub use session::*;
pub use source::{FrameSource, ImageSequenceSource};
pub use synthetic::{SceneConfig, SyntheticScene, SyntheticSource};
