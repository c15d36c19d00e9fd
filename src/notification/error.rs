//! Notification error types.

use thiserror::Error;

/// Errors that can occur while showing notifications.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Failed to show or update a notification.
    #[error("failed to send notification: {0}")]
    SendFailed(String),

    /// The user has not granted notification permission.
    #[error("notification permission denied")]
    PermissionDenied,

    /// No notification surface is available.
    #[error("notifications not available")]
    NotAvailable,
}

impl NotificationError {
    /// Returns true if this error is related to permissions.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }
}
