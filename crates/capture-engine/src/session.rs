//! Capture session: one background worker running the control loop.
//!
//! The worker owns the frame source, the detector, and the orchestrator
//! with all of its tracking state. Presentation only receives finished
//! [`FramePacket`]s over a bounded channel and flips two atomic flags
//! through the [`SessionHandle`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use enhancer_common::clock::{RateController, SessionClock};
use enhancer_common::config::{AppConfig, BackpressurePolicy};
use enhancer_common::error::{EnhancerError, EnhancerResult};
use enhancer_landmark_model::detection::{Detections, LandmarkDetector};
use enhancer_processing_core::orchestrator::{FrameOrchestrator, FramePacket};
use tracing::{debug, info, warn};

use crate::source::FrameSource;

/// Configuration for a capture session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Packets buffered between worker and presentation.
    pub channel_capacity: usize,

    /// What the worker does when the buffer is full.
    pub backpressure: BackpressurePolicy,

    /// Pace frame reads to this rate. `None` reads as fast as possible.
    pub pace_fps: Option<u32>,

    /// Whether tracking is on from the first frame.
    pub start_tracking: bool,

    /// Frame sequence numbers at which the worker flips tracking itself,
    /// before processing that frame.
    pub tracking_toggles: Vec<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 4,
            backpressure: BackpressurePolicy::Block,
            pace_fps: None,
            start_tracking: false,
            tracking_toggles: Vec::new(),
        }
    }
}

impl SessionConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            channel_capacity: config.capture.channel_capacity,
            backpressure: config.capture.backpressure,
            pace_fps: config.capture.pace.then_some(config.capture.fps),
            start_tracking: config.tracking.start_tracking,
            tracking_toggles: Vec::new(),
        }
    }
}

/// Counters returned by the worker when it exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Frames read from the source.
    pub frames_read: u64,

    /// Frames run through the orchestrator.
    pub frames_processed: u64,

    /// Packets discarded because presentation was behind.
    pub frames_dropped: u64,

    /// Detector calls that failed and were treated as empty.
    pub detection_errors: u64,
}

impl WorkerStats {
    /// Drop rate as a percentage.
    pub fn drop_rate(&self) -> f64 {
        if self.frames_processed == 0 {
            return 0.0;
        }
        self.frames_dropped as f64 / self.frames_processed as f64 * 100.0
    }
}

/// Flags shared between the worker and presentation.
#[derive(Debug)]
pub struct SessionControls {
    running: AtomicBool,
    tracking: AtomicBool,
}

impl SessionControls {
    fn new(tracking: bool) -> Self {
        Self {
            running: AtomicBool::new(true),
            tracking: AtomicBool::new(tracking),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.load(Ordering::SeqCst)
    }
}

/// Entry point for starting sessions.
pub struct CaptureSession;

impl CaptureSession {
    /// Spawn the worker thread.
    ///
    /// Fails when the source cannot deliver frames of a usable size or the
    /// thread cannot be spawned.
    pub fn start(
        config: SessionConfig,
        source: Box<dyn FrameSource>,
        detector: Box<dyn LandmarkDetector>,
        orchestrator: FrameOrchestrator,
    ) -> EnhancerResult<SessionHandle> {
        let dimensions = source.dimensions();
        if dimensions.0 == 0 || dimensions.1 == 0 {
            return Err(EnhancerError::capture(format!(
                "Cannot access frame source '{}'",
                source.name()
            )));
        }

        info!(
            source = source.name(),
            detector = detector.name(),
            width = dimensions.0,
            height = dimensions.1,
            capacity = config.channel_capacity,
            backpressure = ?config.backpressure,
            "Starting capture session"
        );

        let controls = Arc::new(SessionControls::new(config.start_tracking));
        let (tx, rx) = mpsc::sync_channel(config.channel_capacity.max(1));

        let worker = Worker {
            config,
            controls: controls.clone(),
            source,
            detector,
            orchestrator,
            tx,
        };
        let join = std::thread::Builder::new()
            .name("enhancer-capture".to_string())
            .spawn(move || worker.run())
            .map_err(|e| EnhancerError::capture(format!("Failed to spawn capture worker: {e}")))?;

        Ok(SessionHandle {
            controls,
            receiver: Some(rx),
            worker: Some(join),
            dimensions,
        })
    }
}

struct Worker {
    config: SessionConfig,
    controls: Arc<SessionControls>,
    source: Box<dyn FrameSource>,
    detector: Box<dyn LandmarkDetector>,
    orchestrator: FrameOrchestrator,
    tx: SyncSender<FramePacket>,
}

impl Worker {
    fn run(mut self) -> WorkerStats {
        let clock = SessionClock::start();
        let mut pacer = self.config.pace_fps.map(RateController::new);
        let mut stats = WorkerStats::default();
        debug!(started_at = clock.epoch_wall(), "Capture worker running");

        loop {
            if !self.controls.is_running() {
                debug!("Stop requested");
                break;
            }

            if let Some(pacer) = pacer.as_mut() {
                let wait = pacer.remaining_ns(clock.elapsed_ns());
                if wait > 0 {
                    std::thread::sleep(Duration::from_nanos(wait));
                }
                pacer.should_tick(clock.elapsed_ns());
            }

            let Some(frame) = self.source.read_frame() else {
                info!(source = self.source.name(), "Frame source ended");
                break;
            };
            stats.frames_read += 1;

            if self.config.tracking_toggles.contains(&frame.sequence) {
                self.controls.tracking.fetch_xor(true, Ordering::SeqCst);
            }
            self.orchestrator.set_tracking(self.controls.is_tracking());

            let detections = if self.orchestrator.is_tracking() {
                match self.detector.detect(&frame) {
                    Ok(detections) => detections,
                    Err(e) => {
                        warn!(
                            sequence = frame.sequence,
                            error = %e,
                            "Detection failed, treating frame as empty"
                        );
                        stats.detection_errors += 1;
                        Detections::default()
                    }
                }
            } else {
                Detections::default()
            };

            let packet = self.orchestrator.process(frame, &detections);
            stats.frames_processed += 1;

            if !self.deliver(packet, &mut stats) {
                debug!("Presentation disconnected");
                break;
            }
        }

        self.source.release();
        self.orchestrator.shutdown();
        self.controls.running.store(false, Ordering::SeqCst);

        info!(
            frames = stats.frames_processed,
            dropped = stats.frames_dropped,
            detection_errors = stats.detection_errors,
            "Capture worker finished"
        );
        stats
    }

    /// Send a packet per the backpressure policy. Returns false once the
    /// receiving side is gone.
    fn deliver(&self, packet: FramePacket, stats: &mut WorkerStats) -> bool {
        match self.config.backpressure {
            BackpressurePolicy::Block => self.tx.send(packet).is_ok(),
            BackpressurePolicy::DropNewest => match self.tx.try_send(packet) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    stats.frames_dropped += 1;
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            },
        }
    }
}

/// Presentation-side handle to a running session.
///
/// Dropping the handle stops the worker and waits for it.
pub struct SessionHandle {
    controls: Arc<SessionControls>,
    receiver: Option<Receiver<FramePacket>>,
    worker: Option<JoinHandle<WorkerStats>>,
    dimensions: (u32, u32),
}

impl SessionHandle {
    /// Source frame size.
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    pub fn set_tracking(&self, enabled: bool) {
        self.controls.tracking.store(enabled, Ordering::SeqCst);
    }

    /// Flip tracking and return the new value.
    pub fn toggle_tracking(&self) -> bool {
        !self.controls.tracking.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn is_tracking(&self) -> bool {
        self.controls.is_tracking()
    }

    /// Whether the worker is still producing frames.
    pub fn is_running(&self) -> bool {
        self.controls.is_running()
    }

    /// Block for the next packet. `None` once the worker has finished.
    pub fn recv(&self) -> Option<FramePacket> {
        self.receiver.as_ref()?.recv().ok()
    }

    /// Wait up to `timeout` for a packet.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<FramePacket, RecvTimeoutError> {
        match self.receiver.as_ref() {
            Some(rx) => rx.recv_timeout(timeout),
            None => Err(RecvTimeoutError::Disconnected),
        }
    }

    /// Drain everything queued and return the newest packet.
    pub fn try_latest(&self) -> Option<FramePacket> {
        self.receiver.as_ref()?.try_iter().last()
    }

    /// Iterate packets until the worker finishes.
    pub fn packets(&self) -> impl Iterator<Item = FramePacket> + '_ {
        self.receiver.iter().flat_map(|rx| rx.iter())
    }

    /// Stop the worker, wait for it, and return its counters.
    pub fn close(mut self) -> EnhancerResult<WorkerStats> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> EnhancerResult<WorkerStats> {
        self.controls.running.store(false, Ordering::SeqCst);
        // Unblocks a worker waiting on a full channel.
        self.receiver.take();

        match self.worker.take() {
            Some(join) => join
                .join()
                .map_err(|_| EnhancerError::capture("Capture worker panicked")),
            None => Ok(WorkerStats::default()),
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(e) = self.shutdown() {
                warn!(error = %e, "Capture session did not shut down cleanly");
            }
        }
    }
}
