//! Shared terminal presentation for sessions.

use std::path::PathBuf;

use clap::Args;
use enhancer_capture_engine::{CaptureSession, FrameSource, SessionConfig, WorkerStats};
use enhancer_common::config::{AppConfig, BackpressurePolicy};
use enhancer_landmark_model::detection::LandmarkDetector;
use enhancer_processing_core::orchestrator::{FrameOrchestrator, FrameStatus, PipelineConfig};
use enhancer_processing_core::volume::AudioSink;
use serde::Serialize;

/// Options shared by every command that runs a session.
#[derive(Args, Debug, Clone)]
pub struct PresentArgs {
    /// Flip tracking when this frame number is reached (repeatable)
    #[arg(long = "toggle-at", value_name = "FRAME")]
    pub toggle_at: Vec<u64>,

    /// Start with tracking off
    #[arg(long)]
    pub no_tracking: bool,

    /// Write every processed frame as PNG into this directory
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Pace frames at the source rate instead of running flat out
    #[arg(long)]
    pub realtime: bool,

    /// Print statuses as JSON lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    frames_read: u64,
    frames_processed: u64,
    frames_dropped: u64,
    detection_errors: u64,
    last_status: Option<FrameStatus>,
}

/// Run a session to the end of its source, printing one line per frame.
pub fn run_session(
    config: &AppConfig,
    source: Box<dyn FrameSource>,
    detector: Box<dyn LandmarkDetector>,
    sink: Box<dyn AudioSink>,
    args: &PresentArgs,
) -> anyhow::Result<()> {
    if let Some(dir) = &args.save_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| anyhow::anyhow!("Cannot create {}: {e}", dir.display()))?;
    }

    let session_config = SessionConfig {
        // Terminal output must show every frame.
        backpressure: BackpressurePolicy::Block,
        pace_fps: args.realtime.then_some(config.capture.fps),
        start_tracking: !args.no_tracking,
        tracking_toggles: args.toggle_at.clone(),
        ..SessionConfig::from_app_config(config)
    };
    let orchestrator = FrameOrchestrator::new(PipelineConfig::from_app_config(config), sink);
    let handle = CaptureSession::start(session_config, source, detector, orchestrator)?;

    let (width, height) = handle.dimensions();
    tracing::info!(width, height, "Session started");

    let mut last_status = None;
    for packet in handle.packets() {
        if args.json {
            println!("{}", serde_json::to_string(&packet.status)?);
        } else {
            println!("{}", packet.status);
        }

        if let Some(dir) = &args.save_dir {
            let path = dir.join(format!("frame_{:05}.png", packet.status.sequence));
            packet
                .frame
                .image
                .save(&path)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
        }
        last_status = Some(packet.status);
    }

    let stats = handle.close()?;
    print_summary(&stats, last_status, args.json)
}

fn print_summary(
    stats: &WorkerStats,
    last_status: Option<FrameStatus>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let summary = RunSummary {
            frames_read: stats.frames_read,
            frames_processed: stats.frames_processed,
            frames_dropped: stats.frames_dropped,
            detection_errors: stats.detection_errors,
            last_status,
        };
        println!("{}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    println!();
    println!("Session finished:");
    println!("  Frames processed: {}", stats.frames_processed);
    println!(
        "  Frames dropped: {} ({:.1}%)",
        stats.frames_dropped,
        stats.drop_rate()
    );
    if stats.detection_errors > 0 {
        println!("  [WARN] Detection errors: {}", stats.detection_errors);
    }
    if let Some(status) = last_status {
        println!(
            "  Final zoom: {:.2}x ({}), volume: {}%",
            status.zoom,
            status.zoom_direction,
            status.volume_percent()
        );
    }
    Ok(())
}
