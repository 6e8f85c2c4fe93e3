//! Background music playback.
//!
//! The output stream is not `Send`, so each [`MusicTrack`] owns a small
//! `enhancer-audio` thread that holds the stream and a rodio [`Sink`] and
//! applies mixer commands sent from the capture worker.

use std::io::Cursor;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::Arc;
use std::thread::JoinHandle;

use enhancer_common::error::{EnhancerError, EnhancerResult};
use enhancer_processing_core::volume::{AudioSink, NullAudioSink};
use rodio::decoder::DecoderError;
use rodio::{Decoder, OutputStream, Sink, Source};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
enum MixerCommand {
    Volume(f32),
    Play { looped: bool },
    Stop,
}

/// Encoded music file held in memory so it can be decoded again per play.
#[derive(Debug, Clone)]
struct AudioAsset {
    bytes: Arc<[u8]>,
}

impl AudioAsset {
    /// Read the file and make sure it decodes.
    fn load(path: &Path) -> EnhancerResult<Self> {
        let bytes: Arc<[u8]> = std::fs::read(path)?.into();
        let asset = Self { bytes };
        asset.decoder().map_err(|e| {
            EnhancerError::audio(format!("Cannot decode {}: {e}", path.display()))
        })?;
        Ok(asset)
    }

    fn decoder(&self) -> Result<Decoder<Cursor<Arc<[u8]>>>, DecoderError> {
        Decoder::new(Cursor::new(self.bytes.clone()))
    }
}

/// Applies mixer commands to a rodio sink.
struct Player {
    sink: Sink,
    asset: AudioAsset,
}

impl Player {
    fn handle(&mut self, command: MixerCommand) {
        match command {
            MixerCommand::Volume(volume) => self.sink.set_volume(volume),
            MixerCommand::Play { looped } => {
                if !self.sink.empty() {
                    self.sink.play();
                    return;
                }
                match self.asset.decoder() {
                    Ok(source) if looped => self.sink.append(source.repeat_infinite()),
                    Ok(source) => self.sink.append(source),
                    Err(e) => {
                        warn!(error = %e, "Music could not be decoded for playback");
                        return;
                    }
                }
                self.sink.play();
            }
            MixerCommand::Stop => self.sink.stop(),
        }
    }
}

/// Audio thread body: open the default output, report readiness, then
/// apply commands until the track is dropped.
fn run_output(
    asset: AudioAsset,
    commands: Receiver<MixerCommand>,
    ready: SyncSender<Result<(), String>>,
) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(output) => output,
        Err(e) => {
            let _ = ready.send(Err(format!("No audio output device: {e}")));
            return;
        }
    };
    let sink = match Sink::try_new(&handle) {
        Ok(sink) => sink,
        Err(e) => {
            let _ = ready.send(Err(format!("Cannot open audio output: {e}")));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    let mut player = Player { sink, asset };
    for command in commands {
        player.handle(command);
    }
    player.sink.stop();
}

/// A music file playing through the default audio output.
#[derive(Debug)]
pub struct MusicTrack {
    name: String,
    volume: f32,
    playing: bool,
    commands: Option<Sender<MixerCommand>>,
    worker: Option<JoinHandle<()>>,
}

impl MusicTrack {
    /// Decode the file and open the default output device.
    ///
    /// A missing file is `FileNotFound`; an undecodable file or missing
    /// output device is an `Audio` error.
    pub fn open(path: &Path) -> EnhancerResult<Self> {
        if !path.is_file() {
            return Err(EnhancerError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let asset = AudioAsset::load(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "music".to_string());

        let (commands, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let worker = std::thread::Builder::new()
            .name("enhancer-audio".to_string())
            .spawn(move || run_output(asset, rx, ready_tx))
            .map_err(|e| EnhancerError::audio(format!("Failed to spawn audio thread: {e}")))?;

        let startup = ready_rx
            .recv()
            .unwrap_or_else(|_| Err("Audio thread exited during startup".to_string()));
        if let Err(message) = startup {
            let _ = worker.join();
            return Err(EnhancerError::audio(message));
        }

        info!(path = %path.display(), "Loaded background music");
        Ok(Self {
            name,
            volume: 1.0,
            playing: false,
            commands: Some(commands),
            worker: Some(worker),
        })
    }

    fn send(&self, command: MixerCommand) {
        let delivered = self
            .commands
            .as_ref()
            .map(|tx| tx.send(command).is_ok())
            .unwrap_or(false);
        if !delivered {
            debug!(track = %self.name, ?command, "Audio thread gone, command dropped");
        }
    }
}

impl AudioSink for MusicTrack {
    fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        if (volume - self.volume).abs() > f32::EPSILON {
            debug!(track = %self.name, volume, "Mixer volume");
        }
        self.volume = volume;
        self.send(MixerCommand::Volume(volume));
    }

    fn play(&mut self, looped: bool) {
        info!(track = %self.name, looped, "Music playing");
        self.playing = true;
        self.send(MixerCommand::Play { looped });
    }

    fn stop(&mut self) {
        if self.playing {
            info!(track = %self.name, "Music stopped");
        }
        self.playing = false;
        self.send(MixerCommand::Stop);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for MusicTrack {
    fn drop(&mut self) {
        // Closing the channel ends the audio thread's command loop.
        self.commands.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!(track = %self.name, "Audio thread panicked");
            }
        }
    }
}

/// Open the music asset, falling back to a silent sink with a warning
/// when it is missing, undecodable, or there is no output device.
pub fn open_music(path: &Path) -> Box<dyn AudioSink> {
    match MusicTrack::open(path) {
        Ok(track) => Box::new(track),
        Err(e) => {
            warn!(error = %e, "Background music unavailable, continuing without audio");
            Box::new(NullAudioSink)
        }
    }
}
