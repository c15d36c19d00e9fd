//! Haptic feedback for the completion alert.
//!
//! Desktop hosts have no vibrator, so the default backend reports itself as
//! unavailable and the feedback adapter skips it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while vibrating.
#[derive(Debug, Error)]
pub enum VibrationError {
    /// No vibrator on this device.
    #[error("vibrator not available")]
    Unavailable,

    /// The vibrator rejected the pattern.
    #[error("vibration failed: {0}")]
    Failed(String),
}

/// Alternating off/on segments, starting with a pause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VibrationPattern {
    timings: Vec<Duration>,
}

impl VibrationPattern {
    /// Creates a pattern from alternating off/on durations.
    #[must_use]
    pub fn new(timings: Vec<Duration>) -> Self {
        Self { timings }
    }

    /// Short double buzz played when a rest period ends.
    #[must_use]
    pub fn rest_complete() -> Self {
        Self::new(
            [0, 300, 200, 300]
                .into_iter()
                .map(Duration::from_millis)
                .collect(),
        )
    }

    #[must_use]
    pub fn timings(&self) -> &[Duration] {
        &self.timings
    }

    /// Total length of the pattern.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.timings.iter().sum()
    }
}

/// Trait for vibration backends.
pub trait Vibrator: Send + Sync {
    /// Plays `pattern` without blocking.
    fn vibrate(&self, pattern: &VibrationPattern) -> Result<(), VibrationError>;

    /// Returns true if the device can vibrate.
    fn is_available(&self) -> bool;
}

/// Vibrator for devices without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopVibrator;

impl Vibrator for NoopVibrator {
    fn vibrate(&self, _pattern: &VibrationPattern) -> Result<(), VibrationError> {
        Err(VibrationError::Unavailable)
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Mock vibrator for testing.
#[derive(Debug, Default)]
pub struct MockVibrator {
    patterns: Mutex<Vec<VibrationPattern>>,
    should_fail: AtomicBool,
}

impl MockVibrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn vibrate_count(&self) -> usize {
        self.patterns.lock().unwrap().len()
    }

    #[must_use]
    pub fn patterns(&self) -> Vec<VibrationPattern> {
        self.patterns.lock().unwrap().clone()
    }
}

impl Vibrator for MockVibrator {
    fn vibrate(&self, pattern: &VibrationPattern) -> Result<(), VibrationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(VibrationError::Failed("Mock failure".to_string()));
        }
        self.patterns.lock().unwrap().push(pattern.clone());
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }
}
