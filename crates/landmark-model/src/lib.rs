//! Call Enhancer Landmark Model
//!
//! Defines the data contracts between capture, detection, and processing:
//! - **Landmarks:** Face-mesh and hand joint points with fixed anatomical indices
//! - **Faces:** Normalized detections and pixel-space face boxes
//! - **Detections:** One frame's detector output and the `LandmarkDetector` seam
//! - **Frames:** RGB video frames with crop/scale helpers
//! - **Viewports:** Normalized crop windows used by the zoom effect
//!
//! Landmark coordinates are normalized to `[0.0, 1.0]` relative to the
//! frame so they are independent of capture resolution.

pub mod detection;
pub mod face;
pub mod frame;
pub mod landmarks;
pub mod viewport;

pub use detection::*;
pub use face::*;
pub use frame::*;
pub use landmarks::*;
pub use viewport::*;
