//! Completion cue playback.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   SoundPlayer    │────▶│   audio thread   │
//! └──────────────────┘     │  (rodio stream)  │
//!                          └────────┬─────────┘
//!                                   ▼
//!                 user file ──(fails)──▶ synthesized beep
//! ```
//!
//! Cues are capped at [`MAX_CUE_DURATION`].

mod error;
mod player;
mod source;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub use error::SoundError;
pub use player::{try_create_player, RodioSoundPlayer};
pub use source::{default_sound, sound_for, SoundSource, BEEP_FREQUENCY, MAX_CUE_DURATION};

/// Trait for sound playback implementations.
pub trait SoundPlayer: Send + Sync {
    /// Plays a sound without blocking.
    ///
    /// Whether a cue should sound at all is decided by the caller from
    /// [`Settings::sound_enabled`](crate::settings::Settings).
    ///
    /// # Errors
    ///
    /// Returns an error if playback could not be started.
    fn play(&self, source: &SoundSource) -> Result<(), SoundError>;
}

impl SoundPlayer for RodioSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        RodioSoundPlayer::play(self, source)
    }
}

/// Mock sound player for testing.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    play_calls: Mutex<Vec<SoundSource>>,
    should_fail: AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().unwrap().len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<SoundSource> {
        self.play_calls.lock().unwrap().clone()
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        self.play_calls.lock().unwrap().push(source.clone());
        Ok(())
    }
}
