//! User-visible rest timer notifications.
//!
//! A [`Notifier`] owns numbered notification slots: showing content in a slot
//! replaces what was there, cancelling clears it. The ongoing indicator uses
//! [`PROGRESS_NOTIFICATION_ID`] and the completion alert
//! [`COMPLETE_NOTIFICATION_ID`].
//!
//! Backends:
//!
//! - [`ConsoleNotifier`]: redraws a single progress line on the terminal
//! - [`LogNotifier`]: emits `tracing` events, for the headless daemon
//! - [`MockNotifier`]: records calls for tests

mod content;
pub mod error;

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::{debug, info};

pub use self::content::{
    channels, complete_content, format_time, paused_content, progress_content,
    NotificationContent, NotificationContentBuilder, Priority, Progress,
    COMPLETE_NOTIFICATION_ID, PROGRESS_NOTIFICATION_ID,
};
pub use self::error::NotificationError;

/// Width of the console progress bar.
const BAR_WIDTH: usize = 20;

/// Trait for notification backends.
pub trait Notifier: Send + Sync {
    /// Shows `content` in its slot, replacing what was there.
    fn show(&self, content: &NotificationContent) -> Result<(), NotificationError>;

    /// Clears slot `id`. Clearing an empty slot is not an error.
    fn cancel(&self, id: u32) -> Result<(), NotificationError>;

    /// Returns true if notifications can be shown.
    fn is_available(&self) -> bool {
        true
    }
}

// ============================================================================
// ConsoleNotifier
// ============================================================================

/// Terminal notifier.
///
/// The ongoing indicator is redrawn in place; alerts are printed on their own
/// line and ring the terminal bell when high priority.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    indicator_visible: AtomicBool,
}

impl ConsoleNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, text: &str) -> Result<(), NotificationError> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| NotificationError::SendFailed(e.to_string()))
    }
}

impl Notifier for ConsoleNotifier {
    fn show(&self, content: &NotificationContent) -> Result<(), NotificationError> {
        if content.ongoing {
            let bar = content
                .progress
                .map(|p| format!(" {}", render_bar(p.fraction())))
                .unwrap_or_default();
            self.indicator_visible.store(true, Ordering::Relaxed);
            return self.write(&format!("\r\x1b[2K{}{}", content, bar));
        }

        let bell = if content.priority == Priority::High {
            "\x07"
        } else {
            ""
        };
        let prefix = if self.indicator_visible.swap(false, Ordering::Relaxed) {
            "\r\x1b[2K"
        } else {
            ""
        };
        self.write(&format!("{prefix}{content}{bell}\n"))
    }

    fn cancel(&self, id: u32) -> Result<(), NotificationError> {
        if id == PROGRESS_NOTIFICATION_ID && self.indicator_visible.swap(false, Ordering::Relaxed) {
            return self.write("\r\x1b[2K");
        }
        Ok(())
    }
}

fn render_bar(fraction: f32) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

// ============================================================================
// LogNotifier
// ============================================================================

/// Notifier that only logs, for contexts without a terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, content: &NotificationContent) -> Result<(), NotificationError> {
        if content.priority == Priority::High {
            info!(id = content.id, channel = content.channel, "{}", content);
        } else {
            debug!(id = content.id, channel = content.channel, "{}", content);
        }
        Ok(())
    }

    fn cancel(&self, id: u32) -> Result<(), NotificationError> {
        debug!(id, "Notification cancelled");
        Ok(())
    }
}

// ============================================================================
// MockNotifier
// ============================================================================

/// A call recorded by [`MockNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    Show(NotificationContent),
    Cancel(u32),
}

/// Mock notifier for testing.
#[derive(Debug)]
pub struct MockNotifier {
    calls: Mutex<Vec<NotifierCall>>,
    available: AtomicBool,
    should_fail: AtomicBool,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Contents shown so far, in order.
    #[must_use]
    pub fn shown(&self) -> Vec<NotificationContent> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NotifierCall::Show(content) => Some(content),
                NotifierCall::Cancel(_) => None,
            })
            .collect()
    }

    #[must_use]
    pub fn show_count(&self) -> usize {
        self.shown().len()
    }

    pub fn clear_recorded(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Notifier for MockNotifier {
    fn show(&self, content: &NotificationContent) -> Result<(), NotificationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("Mock failure".to_string()));
        }
        self.calls
            .lock()
            .unwrap()
            .push(NotifierCall::Show(content.clone()));
        Ok(())
    }

    fn cancel(&self, id: u32) -> Result<(), NotificationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("Mock failure".to_string()));
        }
        self.calls.lock().unwrap().push(NotifierCall::Cancel(id));
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
