//! Replay recorded frames against scripted detections.

use std::path::PathBuf;

use enhancer_capture_engine::{open_music, ImageSequenceSource, ScriptedDetector};
use enhancer_common::config::AppConfig;

use super::present::{run_session, PresentArgs};

pub fn run(
    mut config: AppConfig,
    frames_dir: PathBuf,
    detections: PathBuf,
    fps: Option<u32>,
    music: Option<PathBuf>,
    present: PresentArgs,
) -> anyhow::Result<()> {
    if let Some(fps) = fps {
        config.capture.fps = fps;
    }
    if let Some(music) = music {
        config.audio.music_path = music;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid options: {e}"))?;

    let source = ImageSequenceSource::open(&frames_dir, config.capture.fps)
        .map_err(|e| anyhow::anyhow!("Failed to open frames: {e}"))?;
    let detector = ScriptedDetector::from_path(&detections)
        .map_err(|e| anyhow::anyhow!("Failed to load detections: {e}"))?;

    if detector.len() < source.len() {
        tracing::warn!(
            frames = source.len(),
            scripted = detector.len(),
            "Detection script is shorter than the frame sequence; remaining frames see no detections"
        );
    }
    println!(
        "Replay: {} frames from {}, {} scripted detection sets",
        source.len(),
        frames_dir.display(),
        detector.len()
    );

    let sink = open_music(&config.audio.music_path);
    run_session(&config, Box::new(source), Box::new(detector), sink, &present)
}
