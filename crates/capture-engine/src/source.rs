//! Frame sources.

use std::path::{Path, PathBuf};

use enhancer_common::clock::SessionClock;
use enhancer_common::error::{EnhancerError, EnhancerResult};
use enhancer_landmark_model::frame::VideoFrame;
use tracing::{debug, info, warn};

/// Trait for anything that produces video frames.
///
/// `read_frame` returning `None` ends the stream; the session does not retry.
pub trait FrameSource: Send {
    /// Frame width and height in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Next frame, or `None` at end of stream or on a read failure.
    fn read_frame(&mut self) -> Option<VideoFrame>;

    /// Source name for logging.
    fn name(&self) -> &str;

    /// Free the underlying device or files.
    fn release(&mut self) {}
}

/// File extensions accepted by [`ImageSequenceSource`].
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Plays back a directory of PNG/JPEG files in file name order.
#[derive(Debug)]
pub struct ImageSequenceSource {
    name: String,
    files: Vec<PathBuf>,
    cursor: usize,
    width: u32,
    height: u32,
    frame_interval_ns: u64,
}

impl ImageSequenceSource {
    /// Open a frame directory. A missing or empty directory is an error.
    pub fn open(dir: &Path, fps: u32) -> EnhancerResult<Self> {
        if !dir.is_dir() {
            return Err(EnhancerError::FileNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_image_file(path))
            .collect();
        files.sort();

        let Some(first) = files.first() else {
            return Err(EnhancerError::capture(format!(
                "No PNG or JPEG frames in {}",
                dir.display()
            )));
        };

        let (width, height) = image::image_dimensions(first).map_err(|e| {
            EnhancerError::image(format!("Failed to read {}: {e}", first.display()))
        })?;

        info!(
            dir = %dir.display(),
            frames = files.len(),
            width,
            height,
            "Opened image sequence"
        );

        Ok(Self {
            name: format!("images:{}", dir.display()),
            files,
            cursor: 0,
            width,
            height,
            frame_interval_ns: SessionClock::frame_interval_ns(fps),
        })
    }

    /// Number of frames in the sequence.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_frame(&mut self) -> Option<VideoFrame> {
        let path = self.files.get(self.cursor)?;
        let image = match image::open(path) {
            Ok(img) => img.to_rgb8(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to decode frame");
                return None;
            }
        };

        if image.dimensions() != (self.width, self.height) {
            debug!(path = %path.display(), "Resizing frame to sequence dimensions");
        }

        let sequence = self.cursor as u64;
        self.cursor += 1;
        let frame = VideoFrame::new(image, sequence * self.frame_interval_ns, sequence);
        Some(frame.resized(self.width, self.height))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn release(&mut self) {
        self.cursor = self.files.len();
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
