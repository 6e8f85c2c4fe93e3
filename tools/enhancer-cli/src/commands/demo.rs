//! Run the control loop on a synthetic scene.

use std::path::PathBuf;

use enhancer_capture_engine::{open_music, SceneConfig, SyntheticScene, SyntheticSource};
use enhancer_common::config::AppConfig;

use super::present::{run_session, PresentArgs};

pub struct DemoOptions {
    pub frames: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub faces: usize,
    pub music: Option<PathBuf>,
}

pub fn run(mut config: AppConfig, options: DemoOptions, present: PresentArgs) -> anyhow::Result<()> {
    if let Some(width) = options.width {
        config.capture.width = width;
    }
    if let Some(height) = options.height {
        config.capture.height = height;
    }
    if let Some(fps) = options.fps {
        config.capture.fps = fps;
    }
    if let Some(music) = options.music {
        config.audio.music_path = music;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid options: {e}"))?;
    if options.faces == 0 {
        anyhow::bail!("--faces must be at least 1");
    }

    println!(
        "Demo: {} frames at {}x{} @ {}fps, {} faces",
        options.frames,
        config.capture.width,
        config.capture.height,
        config.capture.fps,
        options.faces
    );

    let source = SyntheticSource::new(config.capture.width, config.capture.height, config.capture.fps)
        .with_frame_limit(options.frames);
    let scene = SyntheticScene::new(SceneConfig {
        faces: options.faces,
        ..SceneConfig::default()
    });
    let sink = open_music(&config.audio.music_path);

    run_session(&config, Box::new(source), Box::new(scene), sink, &present)
}
