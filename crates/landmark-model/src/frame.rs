//! Video frame container passed between capture, processing, and display.

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::viewport::Viewport;

/// Decoded RGB video frame with capture metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// RGB pixel data.
    pub image: RgbImage,
    /// Monotonic capture timestamp (nanoseconds since session start).
    pub timestamp_ns: u64,
    /// Frame sequence number.
    pub sequence: u64,
}

impl VideoFrame {
    pub fn new(image: RgbImage, timestamp_ns: u64, sequence: u64) -> Self {
        Self {
            image,
            timestamp_ns,
            sequence,
        }
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Capture time as fractional seconds.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_ns as f64 / 1_000_000_000.0
    }

    /// Replace the pixels, keeping timing metadata.
    pub fn with_image(&self, image: RgbImage) -> Self {
        Self {
            image,
            timestamp_ns: self.timestamp_ns,
            sequence: self.sequence,
        }
    }

    /// Crop to a normalized viewport and scale the crop back to the
    /// original frame size. A full viewport returns an identical frame.
    pub fn crop_and_scale(&self, viewport: &Viewport) -> Self {
        let (width, height) = (self.width(), self.height());
        let rect = viewport.to_pixels(width, height);
        if rect.is_full(width, height) {
            return self.clone();
        }

        let crop = imageops::crop_imm(&self.image, rect.x, rect.y, rect.width, rect.height).to_image();
        let scaled = imageops::resize(&crop, width, height, FilterType::Triangle);
        self.with_image(scaled)
    }

    /// Rescale to `width` x `height`. Same-size requests return a copy.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        if width == self.width() && height == self.height() {
            return self.clone();
        }
        self.with_image(imageops::resize(&self.image, width, height, FilterType::Triangle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> VideoFrame {
        let image = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 0]));
        VideoFrame::new(image, 33_000_000, 1)
    }

    #[test]
    fn test_full_viewport_is_identity() {
        let frame = gradient(64, 48);
        let out = frame.crop_and_scale(&Viewport::FULL);
        assert_eq!(out, frame);
    }

    #[test]
    fn test_crop_and_scale_keeps_dimensions() {
        let frame = gradient(64, 48);
        let out = frame.crop_and_scale(&Viewport::centered(0.5, 0.5, 0.5, 0.5));
        assert_eq!((out.width(), out.height()), (64, 48));
        assert_eq!(out.sequence, 1);
        // Top-left of the output samples the crop origin (16, 12).
        let px = out.image.get_pixel(0, 0);
        assert!((px[0] as i32 - 16).abs() <= 1);
        assert!((px[1] as i32 - 12).abs() <= 1);
    }

    #[test]
    fn test_resized_keeps_metadata() {
        let frame = gradient(20, 10);
        assert_eq!(frame.resized(20, 10), frame);

        let out = frame.resized(8, 6);
        assert_eq!((out.width(), out.height()), (8, 6));
        assert_eq!((out.timestamp_ns, out.sequence), (33_000_000, 1));
    }

    #[test]
    fn test_timestamp_secs() {
        let frame = gradient(2, 2);
        assert!((frame.timestamp_secs() - 0.033).abs() < 1e-12);
    }
}
