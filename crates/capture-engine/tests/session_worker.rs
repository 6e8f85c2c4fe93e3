use std::path::PathBuf;
use std::time::{Duration, Instant};

use enhancer_common::config::BackpressurePolicy;
use enhancer_common::error::{EnhancerError, EnhancerResult};
use enhancer_capture_engine::{
    CaptureSession, FrameSource, ImageSequenceSource, ScriptedDetector, SessionConfig,
    SyntheticScene, SyntheticSource,
};
use enhancer_landmark_model::detection::{Detections, LandmarkDetector};
use enhancer_landmark_model::frame::VideoFrame;
use enhancer_landmark_model::landmarks::{HandLandmarks, Landmark};
use enhancer_processing_core::orchestrator::{FrameOrchestrator, FramePacket};
use image::{Rgb, RgbImage};

fn blocking(start_tracking: bool) -> SessionConfig {
    SessionConfig {
        channel_capacity: 2,
        backpressure: BackpressurePolicy::Block,
        pace_fps: None,
        start_tracking,
        tracking_toggles: Vec::new(),
    }
}

fn run_to_end(
    config: SessionConfig,
    source: Box<dyn FrameSource>,
    detector: Box<dyn LandmarkDetector>,
) -> (Vec<FramePacket>, enhancer_capture_engine::WorkerStats) {
    let handle =
        CaptureSession::start(config, source, detector, FrameOrchestrator::with_defaults()).unwrap();
    let packets: Vec<FramePacket> = handle.packets().collect();
    let stats = handle.close().unwrap();
    (packets, stats)
}

struct FailingDetector;

impl LandmarkDetector for FailingDetector {
    fn detect(&mut self, frame: &VideoFrame) -> EnhancerResult<Detections> {
        if frame.sequence % 2 == 0 {
            Err(EnhancerError::detection("model crashed"))
        } else {
            Ok(Detections::default())
        }
    }

    fn name(&self) -> &str {
        "failing"
    }
}

struct ZeroSizedSource;

impl FrameSource for ZeroSizedSource {
    fn dimensions(&self) -> (u32, u32) {
        (0, 0)
    }

    fn read_frame(&mut self) -> Option<VideoFrame> {
        None
    }

    fn name(&self) -> &str {
        "unplugged"
    }
}

#[test]
fn synthetic_session_delivers_every_frame_in_order() {
    let source = SyntheticSource::new(160, 120, 30).with_frame_limit(12);
    let (packets, stats) = run_to_end(
        blocking(true),
        Box::new(source),
        Box::new(SyntheticScene::default()),
    );

    assert_eq!(packets.len(), 12);
    assert!(packets
        .iter()
        .enumerate()
        .all(|(i, p)| p.status.sequence == i as u64));
    assert!(packets.iter().all(|p| p.status.tracking && p.status.face_count == 2));
    assert!(packets[0].status.talking);
    assert_eq!(stats.frames_processed, 12);
    assert_eq!(stats.frames_dropped, 0);
    assert_eq!(stats.drop_rate(), 0.0);
}

#[test]
fn tracking_off_passes_frames_through() {
    let source = SyntheticSource::new(64, 48, 30).with_frame_limit(3);
    let (packets, _) = run_to_end(
        blocking(false),
        Box::new(source),
        Box::new(SyntheticScene::default()),
    );

    assert_eq!(packets.len(), 3);
    for packet in packets {
        assert!(!packet.status.tracking);
        assert!(packet.faces.is_empty());
        assert_eq!(packet.status.zoom, 1.0);
    }
}

#[test]
fn scheduled_toggles_apply_on_exact_frames() {
    let source = SyntheticSource::new(32, 24, 30).with_frame_limit(6);
    let config = SessionConfig {
        tracking_toggles: vec![2, 4],
        ..blocking(false)
    };
    let (packets, _) = run_to_end(config, Box::new(source), Box::new(SyntheticScene::default()));

    let tracking: Vec<bool> = packets.iter().map(|p| p.status.tracking).collect();
    assert_eq!(tracking, vec![false, false, true, true, false, false]);
}

#[test]
fn detector_errors_are_counted_not_fatal() {
    let source = SyntheticSource::new(32, 24, 30).with_frame_limit(5);
    let (packets, stats) = run_to_end(blocking(true), Box::new(source), Box::new(FailingDetector));

    assert_eq!(packets.len(), 5);
    assert_eq!(stats.detection_errors, 3);
}

#[test]
fn unusable_source_fails_to_start() {
    let result = CaptureSession::start(
        SessionConfig::default(),
        Box::new(ZeroSizedSource),
        Box::new(SyntheticScene::default()),
        FrameOrchestrator::with_defaults(),
    );
    assert!(matches!(result, Err(EnhancerError::Capture { .. })));
}

#[test]
fn drop_newest_counts_packets_nobody_read() {
    let config = SessionConfig {
        channel_capacity: 1,
        backpressure: BackpressurePolicy::DropNewest,
        pace_fps: None,
        start_tracking: true,
        tracking_toggles: Vec::new(),
    };
    let source = SyntheticSource::new(32, 24, 30).with_frame_limit(10);
    let handle = CaptureSession::start(
        config,
        Box::new(source),
        Box::new(SyntheticScene::default()),
        FrameOrchestrator::with_defaults(),
    )
    .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while handle.is_running() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }

    let latest = handle.try_latest().unwrap();
    assert_eq!(latest.status.sequence, 0);

    let stats = handle.close().unwrap();
    assert_eq!(stats.frames_processed, 10);
    assert_eq!(stats.frames_dropped, 9);
}

#[test]
fn toggle_tracking_flips_flag() {
    let source = SyntheticSource::new(32, 24, 30);
    let handle = CaptureSession::start(
        SessionConfig::default(),
        Box::new(source),
        Box::new(SyntheticScene::default()),
        FrameOrchestrator::with_defaults(),
    )
    .unwrap();

    assert!(!handle.is_tracking());
    assert!(handle.toggle_tracking());
    assert!(handle.is_tracking());
    assert!(!handle.toggle_tracking());

    // Endless source: closing must still return promptly.
    let stats = handle.close().unwrap();
    assert_eq!(stats.frames_dropped, 0);
}

#[test]
fn replay_applies_scripted_fist_to_volume() {
    let dir: PathBuf =
        std::env::temp_dir().join(format!("enhancer-replay-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    for i in 0..3 {
        RgbImage::from_pixel(40, 30, Rgb([10, 10, 10]))
            .save(dir.join(format!("frame_{i:04}.png")))
            .unwrap();
    }

    let fist = Detections {
        hands: vec![HandLandmarks::posed(Landmark::new(0.5, 0.9), 0.3, true)],
        ..Detections::default()
    };
    let script = format!(
        "# fist, nothing, open hand\n{}\n{{}}\n{}\n",
        serde_json::to_string(&fist).unwrap(),
        serde_json::to_string(&Detections {
            hands: vec![HandLandmarks::posed(Landmark::new(0.5, 0.9), 0.3, false)],
            ..Detections::default()
        })
        .unwrap()
    );

    let source = ImageSequenceSource::open(&dir, 30).unwrap();
    let detector = ScriptedDetector::from_jsonl(&script).unwrap();
    let (packets, _) = run_to_end(blocking(true), Box::new(source), Box::new(detector));

    let volumes: Vec<f32> = packets.iter().map(|p| p.status.volume).collect();
    assert_eq!(volumes, vec![0.1, 0.1, 1.0]);

    let _ = std::fs::remove_dir_all(&dir);
}
