//! Core data types for the rest timer.
//!
//! This module defines the data structures used for:
//! - Timer state snapshots
//! - Commands sent to the timer-owning context
//! - Update events broadcast back to listeners
//! - IPC request/response serialization

use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant};

// ============================================================================
// TimerPhase
// ============================================================================

/// Represents the current phase of the rest timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// No countdown is active
    #[default]
    Idle,
    /// Counting down
    Running,
    /// Countdown frozen with time left
    Paused,
}

impl TimerPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
        }
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Point-in-time snapshot of the countdown.
///
/// `end_at` is only set while running; `remaining_seconds` never exceeds
/// `total_seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerState {
    /// Whether the countdown is advancing
    pub is_running: bool,
    /// Seconds left, rounded up
    pub remaining_seconds: u32,
    /// Length of the current rest period in seconds
    pub total_seconds: u32,
    /// Instant at which the countdown reaches zero (running only)
    pub end_at: Option<Instant>,
}

impl TimerState {
    /// The zero state shared by "never started", "skipped" and "completed".
    pub fn idle() -> Self {
        Self::default()
    }

    /// Derives the phase from the snapshot.
    pub fn phase(&self) -> TimerPhase {
        if self.is_running {
            TimerPhase::Running
        } else if self.remaining_seconds > 0 {
            TimerPhase::Paused
        } else {
            TimerPhase::Idle
        }
    }

    /// Returns true if no countdown is active.
    pub fn is_idle(&self) -> bool {
        self.phase() == TimerPhase::Idle
    }

    /// Fraction of the rest period already elapsed, in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        let elapsed = self.total_seconds.saturating_sub(self.remaining_seconds);
        elapsed as f32 / self.total_seconds as f32
    }
}

// ============================================================================
// TimerCommand
// ============================================================================

/// Commands accepted by the timer-owning context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Begin a countdown ending at `end_at`
    Start {
        /// Instant the countdown should reach zero
        end_at: Instant,
        /// Length of the rest period in seconds
        total_seconds: u32,
    },
    /// Freeze the countdown
    Pause,
    /// Continue a frozen countdown
    Resume,
    /// Cancel without completion side effects
    Skip,
    /// Extend the countdown by the given seconds
    AddTime(u32),
    /// Shorten the countdown by the given seconds
    SubtractTime(u32),
}

impl TimerCommand {
    /// Builds a start command for a countdown of `seconds` beginning now.
    pub fn start_now(seconds: u32) -> Self {
        TimerCommand::Start {
            end_at: Instant::now() + Duration::from_secs(u64::from(seconds)),
            total_seconds: seconds,
        }
    }
}

// ============================================================================
// TimerUpdateEvent
// ============================================================================

/// Snapshot broadcast to listeners after every tick and state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimerUpdateEvent {
    /// Seconds left, rounded up
    pub remaining_seconds: u32,
    /// Length of the rest period in seconds
    pub total_seconds: u32,
    /// Whether the countdown is advancing
    pub is_running: bool,
    /// Set on the terminal event of a countdown that ran out
    pub is_complete: bool,
}

impl TimerUpdateEvent {
    /// Creates an event mirroring the given state.
    pub fn from_state(state: &TimerState) -> Self {
        Self {
            remaining_seconds: state.remaining_seconds,
            total_seconds: state.total_seconds,
            is_running: state.is_running,
            is_complete: false,
        }
    }

    /// Creates the terminal event of a countdown that ran out.
    pub fn completed(total_seconds: u32) -> Self {
        Self {
            remaining_seconds: 0,
            total_seconds,
            is_running: false,
            is_complete: true,
        }
    }

    /// Phase the event describes.
    pub fn phase(&self) -> TimerPhase {
        if self.is_running {
            TimerPhase::Running
        } else if self.remaining_seconds > 0 && !self.is_complete {
            TimerPhase::Paused
        } else {
            TimerPhase::Idle
        }
    }
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Start a rest period
    Start {
        /// Rest duration in seconds
        seconds: u32,
    },
    /// Pause the current countdown
    Pause,
    /// Resume the paused countdown
    Resume,
    /// Cancel the current countdown
    Skip,
    /// Extend the current countdown
    Add {
        /// Seconds to add
        seconds: u32,
    },
    /// Shorten the current countdown
    Subtract {
        /// Seconds to subtract
        seconds: u32,
    },
    /// Query the current state
    Status,
    /// Keep the connection open and stream update events
    Watch,
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseData {
    /// Current phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Remaining seconds
    #[serde(rename = "remainingSeconds", skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u32>,
    /// Total seconds of the current rest period
    #[serde(rename = "totalSeconds", skip_serializing_if = "Option::is_none")]
    pub total_seconds: Option<u32>,
}

impl ResponseData {
    /// Creates response data from a timer state.
    pub fn from_timer_state(state: &TimerState) -> Self {
        Self {
            state: Some(state.phase().as_str().to_string()),
            remaining_seconds: Some(state.remaining_seconds),
            total_seconds: Some(state.total_seconds),
        }
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true for success responses.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// Tests
// ============================================================================
