//! Sound playback error types.

use thiserror::Error;

/// Errors that can occur while playing the completion cue.
#[derive(Debug, Error)]
pub enum SoundError {
    /// No audio output device could be opened.
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Sound file was not found at the specified path.
    #[error("sound file not found: {0}")]
    FileNotFound(String),

    /// Failed to decode the audio file.
    #[error("failed to decode sound file: {0}")]
    DecodeError(String),

    /// Failed to create a sink on the output stream.
    #[error("failed to open audio stream: {0}")]
    StreamError(String),

    /// The audio thread is gone.
    #[error("sound playback error: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns true if this error is related to the audio file.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::DecodeError(_))
    }

    /// Returns true if playback should fall back to the synthesized beep.
    #[must_use]
    pub fn should_fallback_to_beep(&self) -> bool {
        self.is_file_error()
    }
}
