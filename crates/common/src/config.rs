//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EnhancerError, EnhancerResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Frame capture and hand-off settings.
    pub capture: CaptureDefaults,

    /// Gesture-to-effect tuning.
    pub tracking: TrackingDefaults,

    /// Background music settings.
    pub audio: AudioDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// What the worker does when the presentation side falls behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpressurePolicy {
    /// Wait until the consumer takes the packet.
    #[default]
    Block,
    /// Discard the packet and keep capturing.
    DropNewest,
}

/// How fist classifications from several hands combine into one flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FistPolicy {
    /// Any closed hand counts as a fist.
    #[default]
    AnyHand,
    /// Only the last reported hand decides.
    LastHand,
}

/// Capture parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureDefaults {
    /// Frame width in pixels.
    pub width: u32,

    /// Frame height in pixels.
    pub height: u32,

    /// Nominal frame rate.
    pub fps: u32,

    /// Capacity of the worker-to-presentation channel.
    pub channel_capacity: usize,

    /// Behaviour when the channel is full.
    pub backpressure: BackpressurePolicy,

    /// Throttle the worker to `fps` instead of running as fast as frames arrive.
    pub pace: bool,
}

/// Gesture detection and camera effect tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingDefaults {
    /// Normalized lip gap above which the mouth counts as open.
    pub mouth_open_threshold: f64,

    /// Number of recent mouth samples kept for talking detection.
    pub mouth_history_size: usize,

    /// Face height fraction below which the camera zooms in.
    pub distance_threshold_lo: f64,

    /// Face height fraction above which the camera zooms out.
    pub distance_threshold_hi: f64,

    /// Lowest zoom factor.
    pub min_zoom: f64,

    /// Highest zoom factor.
    pub max_zoom: f64,

    /// Zoom change per frame.
    pub zoom_speed: f64,

    /// Seconds an unmatched active speaker is kept before being dropped.
    pub zoom_cooldown_secs: f64,

    /// Consecutive frames another speaker must talk alone to take over.
    pub speaker_switch_frames: u32,

    /// Minimum IoU for a face box to count as the same face across frames.
    pub match_iou: f64,

    /// Multi-hand fist aggregation.
    pub fist_policy: FistPolicy,

    /// Draw landmarks, boxes, and hand skeletons on output frames.
    pub annotate: bool,

    /// Whether tracking is enabled as soon as a session starts.
    pub start_tracking: bool,
}

/// Background music parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioDefaults {
    /// Music file played while tracking.
    pub music_path: PathBuf,

    /// Volume with no fist.
    pub default_volume: f32,

    /// Volume while a fist is shown.
    pub low_volume: f32,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "enhancer=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
            channel_capacity: 4,
            backpressure: BackpressurePolicy::Block,
            pace: false,
        }
    }
}

impl Default for TrackingDefaults {
    fn default() -> Self {
        Self {
            mouth_open_threshold: 0.015,
            mouth_history_size: 5,
            distance_threshold_lo: 0.1,
            distance_threshold_hi: 0.3,
            min_zoom: 1.0,
            max_zoom: 2.0,
            zoom_speed: 0.05,
            zoom_cooldown_secs: 2.0,
            speaker_switch_frames: 5,
            match_iou: 0.3,
            fist_policy: FistPolicy::AnyHand,
            annotate: true,
            start_tracking: false,
        }
    }
}

impl Default for AudioDefaults {
    fn default() -> Self {
        Self {
            music_path: PathBuf::from("background_music.mp3"),
            default_volume: 1.0,
            low_volume: 0.1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> EnhancerResult<Self> {
        if !path.exists() {
            return Err(EnhancerError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> EnhancerResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> EnhancerResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject parameter combinations the control loop cannot honour.
    pub fn validate(&self) -> EnhancerResult<()> {
        let t = &self.tracking;
        if t.mouth_history_size == 0 {
            return Err(EnhancerError::config("mouth_history_size must be at least 1"));
        }
        if !(t.min_zoom >= 1.0 && t.min_zoom <= t.max_zoom) {
            return Err(EnhancerError::config(format!(
                "zoom range [{}, {}] is invalid",
                t.min_zoom, t.max_zoom
            )));
        }
        if t.zoom_speed <= 0.0 {
            return Err(EnhancerError::config("zoom_speed must be positive"));
        }
        if t.distance_threshold_lo > t.distance_threshold_hi {
            return Err(EnhancerError::config(
                "distance_threshold_lo must not exceed distance_threshold_hi",
            ));
        }
        if t.zoom_cooldown_secs < 0.0 {
            return Err(EnhancerError::config("zoom_cooldown_secs must not be negative"));
        }

        let a = &self.audio;
        for (name, level) in [("default_volume", a.default_volume), ("low_volume", a.low_volume)] {
            if !(0.0..=1.0).contains(&level) {
                return Err(EnhancerError::config(format!("{name} must be within [0, 1]")));
            }
        }

        let c = &self.capture;
        if c.width == 0 || c.height == 0 || c.fps == 0 {
            return Err(EnhancerError::config("capture width, height, and fps must be non-zero"));
        }
        if c.channel_capacity == 0 {
            return Err(EnhancerError::config("channel_capacity must be at least 1"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("call-enhancer").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tracking.mouth_history_size, 5);
        assert!((config.audio.low_volume - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "tracking": { "zoom_speed": 0.1 } }"#).unwrap();
        assert!((config.tracking.zoom_speed - 0.1).abs() < 1e-9);
        assert!((config.tracking.max_zoom - 2.0).abs() < 1e-9);
        assert_eq!(config.capture.width, 640);
    }

    #[test]
    fn test_policies_use_snake_case() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "tracking": { "fist_policy": "last_hand" },
                 "capture": { "backpressure": "drop_newest" } }"#,
        )
        .unwrap();
        assert_eq!(config.tracking.fist_policy, FistPolicy::LastHand);
        assert_eq!(config.capture.backpressure, BackpressurePolicy::DropNewest);
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut config = AppConfig::default();
        config.tracking.distance_threshold_lo = 0.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.tracking.max_zoom = 0.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.audio.low_volume = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_from() {
        let dir = std::env::temp_dir().join("enhancer_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");

        let mut config = AppConfig::default();
        config.tracking.start_tracking = true;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = AppConfig::load_from(Path::new("/nonexistent/enhancer.json")).unwrap_err();
        assert!(matches!(err, EnhancerError::FileNotFound { .. }));
    }
}
