//! Notification content construction.
//!
//! Content is backend-neutral: the same value is printed by the console
//! notifier, logged by the tracing notifier, and recorded by the mock.

use std::fmt;

/// Maximum length for titles and bodies.
const MAX_TEXT_LENGTH: usize = 100;

/// Slot of the ongoing rest indicator.
pub const PROGRESS_NOTIFICATION_ID: u32 = 1;

/// Slot of the one-shot completion alert.
pub const COMPLETE_NOTIFICATION_ID: u32 = 2;

/// Notification channels.
pub mod channels {
    /// Low-importance channel for the ongoing countdown.
    pub const REST_TIMER: &str = "rest_timer";
    /// High-importance channel for the completion alert.
    pub const REST_COMPLETE: &str = "rest_complete";
}

/// How urgently a notification should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Priority {
    Low,
    #[default]
    Default,
    High,
}

/// Progress bar of an indicator notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: u32,
    pub max: u32,
}

impl Progress {
    /// Fraction done, in `0.0..=1.0`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        (self.current.min(self.max) as f32) / (self.max as f32)
    }
}

/// A notification ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub id: u32,
    pub channel: &'static str,
    pub title: String,
    pub body: String,
    pub priority: Priority,
    /// Ongoing notifications cannot be dismissed by the user.
    pub ongoing: bool,
    pub progress: Option<Progress>,
}

impl fmt::Display for NotificationContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.body)
    }
}

/// Builder for constructing notification content.
#[derive(Debug, Clone)]
pub struct NotificationContentBuilder {
    content: NotificationContent,
}

impl NotificationContentBuilder {
    /// Creates a builder for notification slot `id`.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            content: NotificationContent {
                id,
                channel: channels::REST_TIMER,
                title: String::new(),
                body: String::new(),
                priority: Priority::Default,
                ongoing: false,
                progress: None,
            },
        }
    }

    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.content.title = sanitize(title);
        self
    }

    #[must_use]
    pub fn body(mut self, body: &str) -> Self {
        self.content.body = sanitize(body);
        self
    }

    #[must_use]
    pub fn channel(mut self, channel: &'static str) -> Self {
        self.content.channel = channel;
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.content.priority = priority;
        self
    }

    #[must_use]
    pub fn ongoing(mut self, ongoing: bool) -> Self {
        self.content.ongoing = ongoing;
        self
    }

    #[must_use]
    pub fn progress(mut self, current: u32, max: u32) -> Self {
        self.content.progress = Some(Progress { current, max });
        self
    }

    #[must_use]
    pub fn build(self) -> NotificationContent {
        self.content
    }
}

/// Truncates and strips control characters.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .take(MAX_TEXT_LENGTH)
        .collect()
}

/// Formats seconds as `M:SS`.
#[must_use]
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Ongoing indicator for a running countdown.
///
/// The bar fills as time elapses.
#[must_use]
pub fn progress_content(remaining_seconds: u32, total_seconds: u32) -> NotificationContent {
    NotificationContentBuilder::new(PROGRESS_NOTIFICATION_ID)
        .title("Rest Timer")
        .body(&format!("{} remaining", format_time(remaining_seconds)))
        .channel(channels::REST_TIMER)
        .priority(Priority::Low)
        .ongoing(true)
        .progress(
            total_seconds.saturating_sub(remaining_seconds),
            total_seconds,
        )
        .build()
}

/// Indicator variant for a paused countdown.
#[must_use]
pub fn paused_content(remaining_seconds: u32, total_seconds: u32) -> NotificationContent {
    NotificationContentBuilder::new(PROGRESS_NOTIFICATION_ID)
        .title("Rest Timer (Paused)")
        .body(&format!("{} remaining", format_time(remaining_seconds)))
        .channel(channels::REST_TIMER)
        .priority(Priority::Low)
        .ongoing(true)
        .progress(
            total_seconds.saturating_sub(remaining_seconds),
            total_seconds,
        )
        .build()
}

/// One-shot alert for a finished rest period.
#[must_use]
pub fn complete_content() -> NotificationContent {
    NotificationContentBuilder::new(COMPLETE_NOTIFICATION_ID)
        .title("Rest Complete!")
        .body("Time for your next set")
        .channel(channels::REST_COMPLETE)
        .priority(Priority::High)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(9), "0:09");
        assert_eq!(format_time(90), "1:30");
        assert_eq!(format_time(600), "10:00");
    }

    #[test]
    fn test_progress_content() {
        let content = progress_content(60, 90);
        assert_eq!(content.id, PROGRESS_NOTIFICATION_ID);
        assert_eq!(content.body, "1:00 remaining");
        assert!(content.ongoing);
        assert_eq!(content.priority, Priority::Low);
        assert_eq!(content.progress, Some(Progress { current: 30, max: 90 }));
    }

    #[test]
    fn test_paused_content_shares_slot_with_progress() {
        let paused = paused_content(45, 60);
        assert_eq!(paused.id, progress_content(45, 60).id);
        assert!(paused.title.contains("Paused"));
    }

    #[test]
    fn test_complete_content() {
        let content = complete_content();
        assert_eq!(content.priority, Priority::High);
        assert_eq!(content.channel, channels::REST_COMPLETE);
        assert!(!content.ongoing);
        assert!(content.progress.is_none());
    }

    #[test]
    fn test_builder_sanitizes_text() {
        let content = NotificationContentBuilder::new(9)
            .title("a\nb")
            .body(&"x".repeat(150))
            .build();
        assert_eq!(content.title, "ab");
        assert_eq!(content.body.len(), MAX_TEXT_LENGTH);
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(Progress { current: 0, max: 0 }.fraction(), 0.0);
        assert_eq!(Progress { current: 30, max: 60 }.fraction(), 0.5);
        assert_eq!(Progress { current: 90, max: 60 }.fraction(), 1.0);
    }
}
