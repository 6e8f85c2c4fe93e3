//! Fist-driven background music volume.

use tracing::debug;

/// Audio playback engine the volume controller drives.
pub trait AudioSink: Send {
    /// Set the mixer volume in `[0.0, 1.0]`.
    fn set_volume(&mut self, volume: f32);

    /// Start playback, optionally looping forever.
    fn play(&mut self, looped: bool);

    /// Stop playback.
    fn stop(&mut self);

    /// Sink name for logging.
    fn name(&self) -> &str {
        "audio"
    }
}

/// Sink that accepts every command and does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn set_volume(&mut self, _volume: f32) {}

    fn play(&mut self, _looped: bool) {}

    fn stop(&mut self) {}

    fn name(&self) -> &str {
        "null"
    }
}

/// The two volume presets.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeConfig {
    pub default_volume: f32,
    pub low_volume: f32,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            default_volume: 1.0,
            low_volume: 0.1,
        }
    }
}

/// Maps the fist gesture onto a volume preset and pushes it to the sink.
pub struct VolumeController {
    config: VolumeConfig,
    level: f32,
    playing: bool,
    sink: Box<dyn AudioSink>,
}

impl VolumeController {
    pub fn new(config: VolumeConfig, mut sink: Box<dyn AudioSink>) -> Self {
        let level = config.default_volume;
        sink.set_volume(level);
        Self {
            config,
            level,
            playing: false,
            sink,
        }
    }

    /// Current volume level.
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Apply the fist state: low volume while a fist is held, default otherwise.
    pub fn set_fist_state(&mut self, is_fist: bool) -> f32 {
        let level = if is_fist {
            self.config.low_volume
        } else {
            self.config.default_volume
        };
        self.apply(level);
        level
    }

    /// Return to the default volume.
    pub fn reset(&mut self) {
        self.apply(self.config.default_volume);
    }

    /// Start looped playback if it is not already running.
    pub fn start_playback(&mut self) {
        if !self.playing {
            debug!(sink = self.sink.name(), "Starting background music");
            self.sink.play(true);
            self.playing = true;
        }
    }

    pub fn stop_playback(&mut self) {
        if self.playing {
            debug!(sink = self.sink.name(), "Stopping background music");
            self.sink.stop();
            self.playing = false;
        }
    }

    fn apply(&mut self, level: f32) {
        if level != self.level {
            debug!(from = self.level, to = level, "Volume changed");
        }
        self.level = level;
        self.sink.set_volume(level);
    }
}

impl Default for VolumeController {
    fn default() -> Self {
        Self::new(VolumeConfig::default(), Box::new(NullAudioSink))
    }
}

impl std::fmt::Debug for VolumeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolumeController")
            .field("config", &self.config)
            .field("level", &self.level)
            .field("playing", &self.playing)
            .field("sink", &self.sink.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Volume(f32),
        Play(bool),
        Stop,
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<Call>>>);

    impl AudioSink for RecordingSink {
        fn set_volume(&mut self, volume: f32) {
            self.0.lock().unwrap().push(Call::Volume(volume));
        }

        fn play(&mut self, looped: bool) {
            self.0.lock().unwrap().push(Call::Play(looped));
        }

        fn stop(&mut self) {
            self.0.lock().unwrap().push(Call::Stop);
        }
    }

    #[test]
    fn test_fist_selects_preset_without_lag() {
        let mut volume = VolumeController::default();
        assert_eq!(volume.set_fist_state(true), 0.1);
        assert_eq!(volume.level(), 0.1);
        assert_eq!(volume.set_fist_state(false), 1.0);
        assert_eq!(volume.level(), 1.0);
    }

    #[test]
    fn test_every_update_reaches_sink() {
        let sink = RecordingSink::default();
        let calls = sink.0.clone();
        let mut volume = VolumeController::new(VolumeConfig::default(), Box::new(sink));
        volume.set_fist_state(true);
        volume.set_fist_state(true);
        volume.reset();

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                Call::Volume(1.0),
                Call::Volume(0.1),
                Call::Volume(0.1),
                Call::Volume(1.0)
            ]
        );
    }

    #[test]
    fn test_playback_starts_once() {
        let sink = RecordingSink::default();
        let calls = sink.0.clone();
        let mut volume = VolumeController::new(VolumeConfig::default(), Box::new(sink));
        volume.start_playback();
        volume.start_playback();
        assert!(volume.is_playing());
        volume.stop_playback();
        volume.stop_playback();

        let calls = calls.lock().unwrap();
        assert_eq!(calls[1..], [Call::Play(true), Call::Stop]);
    }
}
