//! Countdown engine for the rest timer.
//!
//! The engine owns a single countdown and derives the remaining time from a
//! fixed end instant on every tick, so suspension of the host process never
//! skews the result. It is a plain state machine: callers pass the current
//! instant, which keeps it deterministic under test.
//!
//! ```text
//! Idle ──start──▶ Running ──pause──▶ Paused
//!  ▲               │  ▲                │
//!  │               │  └─────resume─────┘
//!  ├──────skip─────┴────────skip───────┘
//!  └──(auto)── Complete ◀──zero── Running
//! ```

use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::types::{TimerCommand, TimerPhase, TimerState, TimerUpdateEvent};

// ============================================================================
// Constants
// ============================================================================

/// Interval between recomputations while running.
pub const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Lower bound for the total after `subtract_time`.
const MIN_TOTAL_SECONDS: u32 = 1;

// ============================================================================
// Countdown
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Countdown {
    Idle,
    Running { end_at: Instant, total: u32 },
    Paused { remaining: Duration, total: u32 },
}

/// Rounds a duration up to whole seconds.
fn ceil_seconds(duration: Duration) -> u32 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}

fn seconds(value: u32) -> Duration {
    Duration::from_secs(u64::from(value))
}

// ============================================================================
// CountdownEngine
// ============================================================================

/// State machine behind a single rest period.
///
/// Every mutating method returns the update to broadcast, or `None` when the
/// call was a no-op.
#[derive(Debug, Clone)]
pub struct CountdownEngine {
    countdown: Countdown,
}

impl Default for CountdownEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownEngine {
    /// Creates an idle engine.
    pub fn new() -> Self {
        Self {
            countdown: Countdown::Idle,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> TimerPhase {
        match self.countdown {
            Countdown::Idle => TimerPhase::Idle,
            Countdown::Running { .. } => TimerPhase::Running,
            Countdown::Paused { .. } => TimerPhase::Paused,
        }
    }

    /// Returns true if the countdown is advancing.
    pub fn is_running(&self) -> bool {
        self.phase() == TimerPhase::Running
    }

    /// Instant at which a running countdown reaches zero.
    pub fn deadline(&self) -> Option<Instant> {
        match self.countdown {
            Countdown::Running { end_at, .. } => Some(end_at),
            _ => None,
        }
    }

    /// Computes a snapshot as of `now`.
    pub fn state(&self, now: Instant) -> TimerState {
        match self.countdown {
            Countdown::Idle => TimerState::idle(),
            Countdown::Running { end_at, total } => TimerState {
                is_running: true,
                remaining_seconds: ceil_seconds(end_at.saturating_duration_since(now)).min(total),
                total_seconds: total,
                end_at: Some(end_at),
            },
            Countdown::Paused { remaining, total } => TimerState {
                is_running: false,
                remaining_seconds: ceil_seconds(remaining).min(total),
                total_seconds: total,
                end_at: None,
            },
        }
    }

    /// Dispatches a command.
    pub fn apply(&mut self, command: TimerCommand, now: Instant) -> Option<TimerUpdateEvent> {
        match command {
            TimerCommand::Start {
                end_at,
                total_seconds,
            } => self.start_until(end_at, total_seconds, now),
            TimerCommand::Pause => self.pause(now),
            TimerCommand::Resume => self.resume(now),
            TimerCommand::Skip => self.skip(),
            TimerCommand::AddTime(secs) => self.add_time(secs, now),
            TimerCommand::SubtractTime(secs) => self.subtract_time(secs, now),
        }
    }

    /// Starts a countdown of `duration_seconds` beginning at `now`.
    ///
    /// A zero duration is ignored. Starting over an active countdown
    /// replaces it.
    pub fn start(&mut self, duration_seconds: u32, now: Instant) -> Option<TimerUpdateEvent> {
        self.start_until(now + seconds(duration_seconds), duration_seconds, now)
    }

    fn start_until(
        &mut self,
        end_at: Instant,
        total_seconds: u32,
        now: Instant,
    ) -> Option<TimerUpdateEvent> {
        if total_seconds == 0 || end_at <= now {
            debug!("Ignoring start with non-positive duration");
            return None;
        }

        // The end may not lie further out than the total allows.
        let end_at = end_at.min(now + seconds(total_seconds));

        self.countdown = Countdown::Running {
            end_at,
            total: total_seconds,
        };
        debug!(total_seconds, "Countdown started");
        Some(self.update(now))
    }

    /// Recomputes the remaining time from the end instant.
    ///
    /// Produces exactly one update while running, completing the countdown
    /// once the end instant has passed.
    pub fn tick(&mut self, now: Instant) -> Option<TimerUpdateEvent> {
        match self.countdown {
            Countdown::Running { end_at, total } if now >= end_at => Some(self.complete(total)),
            Countdown::Running { .. } => Some(self.update(now)),
            _ => None,
        }
    }

    /// Freezes a running countdown.
    pub fn pause(&mut self, now: Instant) -> Option<TimerUpdateEvent> {
        let Countdown::Running { end_at, total } = self.countdown else {
            return None;
        };

        let remaining = end_at.saturating_duration_since(now);
        if remaining.is_zero() {
            return Some(self.complete(total));
        }

        self.countdown = Countdown::Paused { remaining, total };
        debug!(remaining_ms = remaining.as_millis() as u64, "Countdown paused");
        Some(self.update(now))
    }

    /// Continues a paused countdown.
    pub fn resume(&mut self, now: Instant) -> Option<TimerUpdateEvent> {
        let Countdown::Paused { remaining, total } = self.countdown else {
            return None;
        };
        if remaining.is_zero() {
            return None;
        }

        self.countdown = Countdown::Running {
            end_at: now + remaining,
            total,
        };
        debug!("Countdown resumed");
        Some(self.update(now))
    }

    /// Cancels the countdown without completing it.
    pub fn skip(&mut self) -> Option<TimerUpdateEvent> {
        if self.countdown == Countdown::Idle {
            return None;
        }

        self.countdown = Countdown::Idle;
        debug!("Countdown skipped");
        Some(TimerUpdateEvent::from_state(&TimerState::idle()))
    }

    /// Extends the countdown and its total by `secs`.
    pub fn add_time(&mut self, secs: u32, now: Instant) -> Option<TimerUpdateEvent> {
        if secs == 0 {
            return None;
        }

        self.countdown = match self.countdown {
            Countdown::Idle => return None,
            Countdown::Running { end_at, total } => Countdown::Running {
                end_at: end_at + seconds(secs),
                total: total.saturating_add(secs),
            },
            Countdown::Paused { remaining, total } => Countdown::Paused {
                remaining: remaining + seconds(secs),
                total: total.saturating_add(secs),
            },
        };
        Some(self.update(now))
    }

    /// Shortens the countdown by `secs`.
    ///
    /// The total is kept at one second or more. Driving the remaining time to
    /// zero completes the countdown immediately.
    pub fn subtract_time(&mut self, secs: u32, now: Instant) -> Option<TimerUpdateEvent> {
        if secs == 0 {
            return None;
        }
        let delta = seconds(secs);

        match self.countdown {
            Countdown::Idle => None,
            Countdown::Running { end_at, total } => {
                let total = total.saturating_sub(secs).max(MIN_TOTAL_SECONDS);
                match end_at.checked_sub(delta).filter(|end| *end > now) {
                    Some(end_at) => {
                        self.countdown = Countdown::Running { end_at, total };
                        Some(self.update(now))
                    }
                    None => Some(self.complete(total)),
                }
            }
            Countdown::Paused { remaining, total } => {
                let total = total.saturating_sub(secs).max(MIN_TOTAL_SECONDS);
                let remaining = remaining.saturating_sub(delta);
                if remaining.is_zero() {
                    Some(self.complete(total))
                } else {
                    self.countdown = Countdown::Paused { remaining, total };
                    Some(self.update(now))
                }
            }
        }
    }

    fn complete(&mut self, total: u32) -> TimerUpdateEvent {
        self.countdown = Countdown::Idle;
        debug!(total_seconds = total, "Countdown complete");
        TimerUpdateEvent::completed(total)
    }

    fn update(&self, now: Instant) -> TimerUpdateEvent {
        TimerUpdateEvent::from_state(&self.state(now))
    }
}

// ============================================================================
// Tests
// ============================================================================
