//! Call Enhancer desktop window.
//!
//! Shows the processed camera feed next to the tracking controls, a volume
//! meter, and the rotatable shape viewer. All processing happens on the
//! capture worker; this thread only draws the newest packet.

use std::time::Duration;

use eframe::egui::{self, Color32};
use enhancer_capture_engine::{
    open_music, CaptureSession, SessionConfig, SessionHandle, SyntheticScene, SyntheticSource,
};
use enhancer_common::config::{AppConfig, BackpressurePolicy};
use enhancer_processing_core::orchestrator::{FrameOrchestrator, FrameStatus, PipelineConfig};
use enhancer_processing_core::shape::RotatableShape;

mod shape_view;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();
    enhancer_common::logging::init_logging(&config.logging);

    let handle = start_session(&config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Video Call Enhancer")
            .with_inner_size([
                config.capture.width as f32 + 340.0,
                (config.capture.height as f32).max(360.0) + 120.0,
            ]),
        ..Default::default()
    };

    eframe::run_native(
        "Video Call Enhancer",
        options,
        Box::new(|_cc| Box::new(EnhancerApp::new(handle))),
    )
    .map_err(|e| anyhow::anyhow!("window launch failed: {e}"))
}

fn start_session(config: &AppConfig) -> anyhow::Result<SessionHandle> {
    let capture = &config.capture;
    let session_config = SessionConfig {
        // Live view only needs the newest frame.
        backpressure: BackpressurePolicy::DropNewest,
        pace_fps: Some(capture.fps),
        ..SessionConfig::from_app_config(config)
    };
    let source = SyntheticSource::new(capture.width, capture.height, capture.fps);
    let orchestrator = FrameOrchestrator::new(
        PipelineConfig::from_app_config(config),
        open_music(&config.audio.music_path),
    );

    CaptureSession::start(
        session_config,
        Box::new(source),
        Box::new(SyntheticScene::default()),
        orchestrator,
    )
    .map_err(|e| anyhow::anyhow!("Failed to start capture: {e}"))
}

struct EnhancerApp {
    session: Option<SessionHandle>,
    texture: Option<egui::TextureHandle>,
    status: Option<FrameStatus>,
    shape: RotatableShape,
    message: String,
}

impl EnhancerApp {
    fn new(session: SessionHandle) -> Self {
        Self {
            session: Some(session),
            texture: None,
            status: None,
            shape: RotatableShape::default(),
            message: "Ready".to_string(),
        }
    }

    fn is_tracking(&self) -> bool {
        self.session
            .as_ref()
            .map(SessionHandle::is_tracking)
            .unwrap_or(false)
    }

    fn poll_frames(&mut self, ctx: &egui::Context) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        if let Some(packet) = session.try_latest() {
            let image = &packet.frame.image;
            let size = [image.width() as usize, image.height() as usize];
            let color = egui::ColorImage::from_rgb(size, image.as_raw());
            match self.texture.as_mut() {
                Some(texture) => texture.set(color, egui::TextureOptions::LINEAR),
                None => {
                    self.texture =
                        Some(ctx.load_texture("camera", color, egui::TextureOptions::LINEAR));
                }
            }
            self.status = Some(packet.status);
        } else if !session.is_running() {
            self.message = "Camera feed ended".to_string();
        }
    }

    fn toggle_tracking(&mut self) {
        if let Some(session) = self.session.as_ref() {
            let tracking = session.toggle_tracking();
            self.message = if tracking {
                "Tracking started".to_string()
            } else {
                "Tracking stopped".to_string()
            };
        }
    }

    fn close_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match session.close() {
            Ok(stats) => tracing::info!(
                frames = stats.frames_processed,
                dropped = stats.frames_dropped,
                "Session closed"
            ),
            Err(e) => tracing::warn!(error = %e, "Session did not close cleanly"),
        }
    }

    fn video_panel(&self, ui: &mut egui::Ui) {
        match self.texture.as_ref() {
            Some(texture) => {
                let tex_size = texture.size_vec2();
                let scale = (ui.available_width() / tex_size.x).min(1.0);
                ui.add(egui::Image::new(egui::load::SizedTexture::new(
                    texture.id(),
                    tex_size * scale,
                )));
            }
            None => {
                ui.label("Waiting for camera...");
            }
        }
    }

    fn status_panel(&mut self, ui: &mut egui::Ui) {
        let tracking = self.is_tracking();
        let label = if tracking { "Stop Tracking" } else { "Start Tracking" };
        let fill = if tracking {
            Color32::from_rgb(200, 52, 52)
        } else {
            Color32::from_rgb(40, 140, 70)
        };
        if ui.add(egui::Button::new(label).fill(fill)).clicked() {
            self.toggle_tracking();
        }

        ui.add_space(8.0);
        let (volume, percent) = self
            .status
            .as_ref()
            .map(|s| (s.volume, s.volume_percent()))
            .unwrap_or((1.0, 100));
        ui.label(format!("Volume: {percent}%"));
        ui.add(egui::ProgressBar::new(volume).desired_width(200.0));

        ui.add_space(8.0);
        match self.status.as_ref() {
            Some(status) => {
                ui.label(format!("Faces: {}", status.face_count));
                ui.label(format!("Talking: {}", yes_no(status.talking)));
                ui.label(format!("Zoom: {:.1}x ({})", status.zoom, status.zoom_direction));
                ui.label(format!("Fist: {}", yes_no(status.fist)));
            }
            None => {
                ui.label("No frames yet");
            }
        }

        ui.add_space(8.0);
        ui.separator();
        shape_view::show(ui, &mut self.shape);

        ui.add_space(8.0);
        ui.label(format!("Status: {}", self.message));
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

impl eframe::App for EnhancerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(Duration::from_millis(15));
        self.poll_frames(ctx);

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Video Call Enhancer");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Close").clicked() {
                        self.close_session();
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        egui::SidePanel::right("status")
            .resizable(false)
            .min_width(320.0)
            .show(ctx, |ui| self.status_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.video_panel(ui));
    }
}
