//! Sound player implementation using rodio.
//!
//! The rodio output stream is not `Send`, so it lives on a dedicated audio
//! thread. `RodioSoundPlayer` only holds the sending half of a queue to that
//! thread and can be shared freely.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use rodio::source::{SineWave, Source, Zero};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::error::SoundError;
use super::source::{SoundSource, BEEP_FREQUENCY, MAX_CUE_DURATION};

const BEEP_COUNT: usize = 3;
const BEEP_TONE: Duration = Duration::from_millis(300);
const BEEP_GAP: Duration = Duration::from_millis(200);
const BEEP_VOLUME: f32 = 0.25;
const SAMPLE_RATE: u32 = 44_100;

/// A sound player backed by a rodio output stream on its own thread.
///
/// Playback is non-blocking; cues keep playing after `play` returns.
pub struct RodioSoundPlayer {
    queue: mpsc::Sender<SoundSource>,
}

impl RodioSoundPlayer {
    /// Opens the default output device.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, SoundError> {
        let (queue, requests) = mpsc::channel::<SoundSource>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), SoundError>>();

        thread::Builder::new()
            .name("liftlog-audio".to_string())
            .spawn(move || audio_thread(requests, ready_tx))
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))??;

        debug!("Audio output stream initialized");

        Ok(Self { queue })
    }

    /// Queues `source` for playback.
    ///
    /// File sources that cannot be opened or decoded fall back to the
    /// synthesized beep on the audio thread.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::PlaybackError` if the audio thread has stopped.
    pub fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        self.queue
            .send(source.clone())
            .map_err(|_| SoundError::PlaybackError("audio thread stopped".to_string()))
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer").finish_non_exhaustive()
    }
}

fn audio_thread(requests: mpsc::Receiver<SoundSource>, ready: mpsc::Sender<Result<(), SoundError>>) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = ready.send(Err(SoundError::DeviceNotAvailable(e.to_string())));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    for source in requests {
        if let Err(e) = play_source(&handle, &source) {
            warn!("Failed to play sound '{}': {}", source.name(), e);
        }
    }
    debug!("Audio thread stopped");
}

fn play_source(handle: &OutputStreamHandle, source: &SoundSource) -> Result<(), SoundError> {
    match source {
        SoundSource::File { name, path } => {
            debug!("Playing sound file: {}", name);
            match play_file(handle, path) {
                Err(e) if e.should_fallback_to_beep() => {
                    warn!("Cannot play '{}': {}, falling back to beep", name, e);
                    play_beep(handle)
                }
                other => other,
            }
        }
        SoundSource::Beep { name } => {
            debug!("Playing beep: {}", name);
            play_beep(handle)
        }
    }
}

fn play_file(handle: &OutputStreamHandle, path: &Path) -> Result<(), SoundError> {
    let file = File::open(path)
        .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;
    let decoder =
        Decoder::new(BufReader::new(file)).map_err(|e| SoundError::DecodeError(e.to_string()))?;

    let sink = Sink::try_new(handle).map_err(|e| SoundError::StreamError(e.to_string()))?;
    sink.append(decoder.take_duration(MAX_CUE_DURATION));
    sink.detach();
    Ok(())
}

fn play_beep(handle: &OutputStreamHandle) -> Result<(), SoundError> {
    let sink = Sink::try_new(handle).map_err(|e| SoundError::StreamError(e.to_string()))?;
    for _ in 0..BEEP_COUNT {
        sink.append(
            SineWave::new(BEEP_FREQUENCY)
                .take_duration(BEEP_TONE)
                .amplify(BEEP_VOLUME),
        );
        sink.append(Zero::<f32>::new(1, SAMPLE_RATE).take_duration(BEEP_GAP));
    }
    sink.detach();
    Ok(())
}

/// Creates a sound player, returning None if audio is unavailable.
#[must_use]
pub fn try_create_player() -> Option<Arc<RodioSoundPlayer>> {
    match RodioSoundPlayer::new() {
        Ok(player) => Some(Arc::new(player)),
        Err(e) => {
            warn!("Audio not available, sound disabled: {}", e);
            None
        }
    }
}
